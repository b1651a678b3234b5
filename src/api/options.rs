use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct PaxosOptions {
    pub rpc_timeout: Option<Duration>,
    pub backoff_min: Option<Duration>,
    pub backoff_max: Option<Duration>,
}

pub(super) struct PaxosOptionsValidated {
    pub rpc_timeout: Duration,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl PaxosOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.rpc_timeout == Duration::from_millis(0) {
            return Err("RPC timeout must be greater than zero");
        }
        if self.backoff_min == Duration::from_millis(0) {
            return Err("Minimum backoff must be greater than zero");
        }
        if self.backoff_min > self.backoff_max {
            return Err("Minimum backoff must not exceed maximum backoff");
        }

        Ok(())
    }
}

impl TryFrom<PaxosOptions> for PaxosOptionsValidated {
    type Error = &'static str;

    fn try_from(options: PaxosOptions) -> Result<Self, Self::Error> {
        let values = PaxosOptionsValidated {
            rpc_timeout: options.rpc_timeout.unwrap_or(Duration::from_millis(500)),
            backoff_min: options.backoff_min.unwrap_or(Duration::from_millis(10)),
            backoff_max: options.backoff_max.unwrap_or(Duration::from_secs(1)),
        };

        values.validate()?;
        Ok(values)
    }
}
