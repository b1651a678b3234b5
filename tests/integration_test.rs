use bytes::Bytes;
use chrono::Utc;
use multipaxos::{Fate, PaxosMemberInfo, PaxosOptions, PaxosPeer, PaxosPeerConfig};
use slog::Drain;
use std::error::Error;
use std::io;
use std::net::Ipv4Addr;
use tokio::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_proposer() -> Result<(), Box<dyn Error>> {
    let num_members = 3;
    let peers = create_peers(num_members, 7100).await?;

    peers[0].start(0, "hello");
    wait_for_decision(&peers, 0, num_members, Duration::from_secs(10)).await;

    for peer in peers.iter() {
        assert_eq!(Fate::Decided(Bytes::from("hello")), peer.status(0));
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_proposers_converge() -> Result<(), Box<dyn Error>> {
    let num_members = 3;
    let peers = create_peers(num_members, 7200).await?;

    for (i, peer) in peers.iter().enumerate() {
        peer.start(1, format!("value-from-{}", i));
    }
    let decided = wait_for_decision(&peers, 1, num_members, Duration::from_secs(10)).await;
    println!("Decided {:?}", decided);

    for peer in peers.iter() {
        assert_eq!(Fate::Decided(decided.clone()), peer.status(1));
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn majority_decides_after_kill() -> Result<(), Box<dyn Error>> {
    let num_members = 3;
    let peers = create_peers(num_members, 7300).await?;

    peers[0].start(0, "before");
    wait_for_decision(&peers, 0, num_members, Duration::from_secs(10)).await;

    peers[2].kill();
    assert!(peers[2].is_dead());
    // Give the server a moment to shut down.
    sleep(Duration::from_millis(200)).await;

    peers[1].start(1, "after");
    wait_for_decision(&peers[..2], 1, 2, Duration::from_secs(10)).await;
    assert_eq!(Fate::Pending, peers[2].status(1));

    // Done horizons piggyback over gRPC too. Peer 2 is dead, so nothing can be forgotten.
    peers[0].done(1);
    peers[1].done(1);
    peers[0].start(2, "poke");
    wait_for_decision(&peers[..2], 2, 2, Duration::from_secs(10)).await;
    assert_eq!(0, peers[0].min());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn done_propagates_over_grpc() -> Result<(), Box<dyn Error>> {
    let num_members = 3;
    let peers = create_peers(num_members, 7400).await?;

    for seq in 0..3 {
        peers[0].start(seq, "x");
        wait_for_decision(&peers, seq, num_members, Duration::from_secs(10)).await;
    }
    for peer in peers.iter() {
        peer.done(1);
    }
    for (i, peer) in peers.iter().enumerate() {
        peer.start(3 + i as u64, "poke");
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    while peers.iter().any(|peer| peer.min() != 2) {
        assert!(Instant::now() < deadline, "min() did not advance");
        sleep(Duration::from_millis(50)).await;
    }
    for peer in peers.iter() {
        assert_eq!(Fate::Forgotten, peer.status(1));
        assert!(peer.rpc_count() > 0);
    }

    Ok(())
}

async fn create_peers(num_members: usize, port_base: u16) -> Result<Vec<PaxosPeer>, Box<dyn Error>> {
    let mut peers = Vec::with_capacity(num_members);
    for i in 0..num_members {
        let peer = multipaxos::try_create_paxos_peer(config(i, num_members, port_base)).await?;
        peers.push(peer);
    }

    Ok(peers)
}

fn config(me: usize, num_members: usize, port_base: u16) -> PaxosPeerConfig {
    assert!(me < num_members, "me must be in the range [0, {}]", num_members - 1);

    let mut members = Vec::with_capacity(num_members);
    for i in 0..num_members {
        members.push(member_info(port_base, i));
    }

    PaxosPeerConfig {
        me,
        members,
        info_logger: create_root_logger_for_stdout(me),
        options: PaxosOptions {
            rpc_timeout: Some(Duration::from_millis(300)),
            ..PaxosOptions::default()
        },
    }
}

fn member_info(port_base: u16, id: usize) -> PaxosMemberInfo {
    PaxosMemberInfo {
        ip_addr: Ipv4Addr::from([127, 0, 0, 1]),
        rpc_port: port_base + id as u16,
    }
}

/// Waits until at least `wanted` peers have decided `seq`, and returns the decided value.
async fn wait_for_decision(peers: &[PaxosPeer], seq: u64, wanted: usize, timeout: Duration) -> Bytes {
    let deadline = Instant::now() + timeout;

    loop {
        let decided: Vec<Bytes> = peers
            .iter()
            .filter_map(|peer| peer.status(seq).decided_value().cloned())
            .collect();
        if let Some(first) = decided.first() {
            assert!(decided.iter().all(|v| v == first), "Peers disagree on seq {}", seq);
            if decided.len() >= wanted {
                return first.clone();
            }
        }

        assert!(Instant::now() < deadline, "Timeout waiting for seq {} to be decided", seq);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn create_root_logger_for_stdout(me: usize) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator)
        .use_custom_timestamp(timestamp_utc)
        .use_file_location()
        .build()
        .fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("TestPeer" => me))
}

fn timestamp_utc(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
}

async fn sleep(duration: Duration) {
    println!("Sleep {}ms", duration.as_millis());
    tokio::time::sleep(duration).await;
    println!("Awake!");
}
