use ethers::types::H160;
use serde::Deserialize;

/// An account entry as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConf {
    /// Hex address of the account
    pub address: String,
    /// Human-friendly display name, used as a metric label
    pub nickname: String,
    /// Whether the account is a Safe-style contract with a readable nonce
    pub safe: bool,
}

/// A validated account to monitor.
#[derive(Debug, Clone)]
pub struct Account {
    /// Address of the account
    pub address: H160,
    /// Human-friendly display name, used as a metric label
    pub nickname: String,
    /// Whether the account is a Safe-style contract with a readable nonce
    pub safe: bool,
}

impl Account {
    /// The full hex form of the address, used as a metric label.
    pub fn address_label(&self) -> String {
        format!("{:?}", self.address)
    }
}

/// An account whose address could not be parsed out of the configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid address {address:?} for account {nickname:?}")]
pub struct InvalidAccountAddress {
    /// The raw address string from the config
    pub address: String,
    /// The nickname of the offending entry
    pub nickname: String,
}

/// The ordered, immutable set of accounts to monitor. Built once at process
/// initialization; iteration order equals input order and is stable across
/// ticks. Duplicate addresses are permitted and processed independently.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    /// Validate raw config entries into typed accounts. Any unparseable
    /// address fails the whole registry.
    pub fn from_confs(confs: &[AccountConf]) -> Result<Self, InvalidAccountAddress> {
        let accounts = confs
            .iter()
            .map(|conf| {
                let address = conf.address.parse::<H160>().map_err(|_| {
                    InvalidAccountAddress {
                        address: conf.address.clone(),
                        nickname: conf.nickname.clone(),
                    }
                })?;
                Ok(Account {
                    address,
                    nickname: conf.nickname.clone(),
                    safe: conf.safe,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { accounts })
    }

    /// Iterate the accounts in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }

    /// Number of accounts in the registry.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn conf(address: &str, nickname: &str, safe: bool) -> AccountConf {
        AccountConf {
            address: address.into(),
            nickname: nickname.into(),
            safe,
        }
    }

    #[test]
    fn registry_preserves_input_order_and_duplicates() {
        let confs = vec![
            conf("0x00000000000000000000000000000000000000aa", "alice", false),
            conf("0x00000000000000000000000000000000000000bb", "bob", true),
            conf("0x00000000000000000000000000000000000000aa", "alice", false),
        ];
        let registry = AccountRegistry::from_confs(&confs).unwrap();
        assert_eq!(registry.len(), 3);
        let nicknames: Vec<_> = registry.iter().map(|a| a.nickname.as_str()).collect();
        assert_eq!(nicknames, vec!["alice", "bob", "alice"]);
        assert_eq!(
            registry.iter().next().unwrap().address,
            H160::from_low_u64_be(0xaa)
        );
    }

    #[test]
    fn registry_rejects_malformed_addresses() {
        let confs = vec![conf("not-an-address", "mallory", false)];
        let err = AccountRegistry::from_confs(&confs).unwrap_err();
        assert!(err.to_string().contains("mallory"));
    }

    #[test]
    fn account_conf_requires_all_fields() {
        // missing `address`
        let missing_address = r#"[{"nickname": "alice", "safe": false}]"#;
        assert!(serde_json::from_str::<Vec<AccountConf>>(missing_address).is_err());

        // not an array at all
        assert!(serde_json::from_str::<Vec<AccountConf>>(r#"{"address": "0x"}"#).is_err());

        let ok = r#"[{"address": "0x00000000000000000000000000000000000000aa",
                      "nickname": "alice", "safe": true}]"#;
        let confs = serde_json::from_str::<Vec<AccountConf>>(ok).unwrap();
        assert!(confs[0].safe);
    }

    #[test]
    fn address_label_is_full_hex() {
        let registry = AccountRegistry::from_confs(&[conf(
            "0x00000000000000000000000000000000000000aa",
            "alice",
            false,
        )])
        .unwrap();
        assert_eq!(
            registry.iter().next().unwrap().address_label(),
            "0x00000000000000000000000000000000000000aa"
        );
    }
}
