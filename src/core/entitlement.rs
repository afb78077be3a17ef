//! # Entitlement
//!
//! The single place that decides what a premium ("Pro") user gets.
//! Components never look at a raw boolean; they ask `allows(Capability)`.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

/// UI affordances gated by the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// "Pro" badge on message bubbles and in the header.
    ProBadge,
    /// "Advanced Features Unlocked" badge in the composer.
    AdvancedFeatures,
    /// "Upgrade to Pro" prompts (header, history panel, composer footer).
    UpgradePrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entitlement {
    plan: Plan,
}

impl Entitlement {
    pub fn new(plan: Plan) -> Self {
        Self { plan }
    }

    pub fn from_premium_flag(is_premium: bool) -> Self {
        Self::new(if is_premium { Plan::Pro } else { Plan::Free })
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn is_premium(&self) -> bool {
        self.plan == Plan::Pro
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ProBadge | Capability::AdvancedFeatures => self.is_premium(),
            Capability::UpgradePrompt => !self.is_premium(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_plan_only_sees_upgrade_prompt() {
        let free = Entitlement::default();
        assert!(!free.is_premium());
        assert!(free.allows(Capability::UpgradePrompt));
        assert!(!free.allows(Capability::ProBadge));
        assert!(!free.allows(Capability::AdvancedFeatures));
    }

    #[test]
    fn test_pro_plan_unlocks_badges_and_hides_upgrade() {
        let pro = Entitlement::from_premium_flag(true);
        assert_eq!(pro.plan(), Plan::Pro);
        assert!(pro.allows(Capability::ProBadge));
        assert!(pro.allows(Capability::AdvancedFeatures));
        assert!(!pro.allows(Capability::UpgradePrompt));
    }
}
