//! Configuration

use fleetwatch_base::decl_settings;
use fleetwatch_core::{AccountConf, StrOrInt};

decl_settings!(Monitor {
    /// The accounts to watch
    accounts: Vec<AccountConf>,
    /// How long to wait between the end of one pass over the accounts and
    /// the start of the next, in milliseconds
    #[serde(alias = "loopIntervalMs")]
    loopintervalms: Option<StrOrInt>,
});
