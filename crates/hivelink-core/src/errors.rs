//! Error types for the uplink manager
//!
//! Transport-level failures are kept separate from manager-level errors so the
//! retry/fallback machinery can absorb the former without surfacing them to
//! callers, per the propagation policy: transient failures are recovered
//! locally and only ever visible as a `Deferred` submission outcome.

use crate::types::LinkKind;

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Failures reported by an individual uplink transport
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum TransportError {
            #[error("{link} link is not ready to send")]
            NotReady { link: LinkKind },
            #[error("{link} send failed")]
            SendFailed { link: LinkKind },
            #[error("{link} cannot report signal strength")]
            RssiUnavailable { link: LinkKind },
            #[error("{link} power control failed")]
            PowerFailed { link: LinkKind },
        }
    } else {
        /// Failures reported by an individual uplink transport (no_std version)
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum TransportError {
            NotReady { link: LinkKind },
            SendFailed { link: LinkKind },
            RssiUnavailable { link: LinkKind },
            PowerFailed { link: LinkKind },
        }
    }
}

impl TransportError {
    /// The link that reported the failure
    pub fn link(&self) -> LinkKind {
        match self {
            TransportError::NotReady { link }
            | TransportError::SendFailed { link }
            | TransportError::RssiUnavailable { link }
            | TransportError::PowerFailed { link } => *link,
        }
    }
}

// ----------------------------------------------------------------------------
// Uplink Errors
// ----------------------------------------------------------------------------

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Errors surfaced by the uplink manager's public operations
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum UplinkError {
            /// Rejected synchronously with no state change
            #[error("invalid configuration: {reason}")]
            InvalidConfig { reason: &'static str },

            /// A submission carried nothing to deliver
            #[error("invalid measurement: empty payload")]
            EmptyMeasurement,

            /// The manager has been powered down
            #[error("uplinks are powered down")]
            PoweredDown,

            #[error("transport error: {0}")]
            Transport(#[from] TransportError),
        }
    } else {
        /// Errors surfaced by the uplink manager's public operations (no_std version)
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum UplinkError {
            InvalidConfig { reason: &'static str },
            EmptyMeasurement,
            PoweredDown,
            Transport(TransportError),
        }

        impl From<TransportError> for UplinkError {
            fn from(err: TransportError) -> Self {
                UplinkError::Transport(err)
            }
        }
    }
}

impl UplinkError {
    /// Create a configuration error with a reason
    pub fn invalid_config(reason: &'static str) -> Self {
        UplinkError::InvalidConfig { reason }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, UplinkError>;
