//! Static insurer directory used by the insurance flow and the free-text helper.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsurerInfo {
    pub name: &'static str,
    /// Lowercase substrings that identify the insurer in free text.
    pub keywords: &'static [&'static str],
    /// Value of the matching option in the insurance flow, if it has one.
    pub option_value: Option<&'static str>,
    pub requires_specialist_referral: bool,
    pub notes: &'static str,
}

pub const INSURERS: &[InsurerInfo] = &[
    InsurerInfo {
        name: "Blue Cross Blue Shield",
        keywords: &["blue cross", "blue shield", "bcbs"],
        option_value: Some("blue_cross"),
        requires_specialist_referral: false,
        notes: "PPO plans let you see in-network specialists without a referral; HMO plans need one from your PCP.",
    },
    InsurerInfo {
        name: "Aetna",
        keywords: &["aetna"],
        option_value: Some("aetna"),
        requires_specialist_referral: false,
        notes: "Most Aetna plans cover specialist visits directly; check whether your plan is an HMO.",
    },
    InsurerInfo {
        name: "UnitedHealthcare",
        keywords: &["unitedhealthcare", "united healthcare", "united health", "uhc"],
        option_value: Some("united"),
        requires_specialist_referral: true,
        notes: "UnitedHealthcare plans usually require a PCP referral before specialist visits.",
    },
    InsurerInfo {
        name: "Cigna",
        keywords: &["cigna"],
        option_value: Some("cigna"),
        requires_specialist_referral: false,
        notes: "Cigna Open Access plans do not require referrals; Cigna HMO plans do.",
    },
    InsurerInfo {
        name: "Medicare",
        keywords: &["medicare"],
        option_value: Some("medicare"),
        requires_specialist_referral: false,
        notes: "Original Medicare does not require referrals; Medicare Advantage HMO plans often do.",
    },
    InsurerInfo {
        name: "Medicaid",
        keywords: &["medicaid"],
        option_value: Some("medicaid"),
        requires_specialist_referral: true,
        notes: "Medicaid managed care plans require a referral from your assigned PCP for specialist care.",
    },
    InsurerInfo {
        name: "Kaiser Permanente",
        keywords: &["kaiser"],
        option_value: None,
        requires_specialist_referral: true,
        notes: "Kaiser members are seen within the Kaiser network; specialist care needs a Kaiser referral.",
    },
    InsurerInfo {
        name: "Humana",
        keywords: &["humana"],
        option_value: None,
        requires_specialist_referral: false,
        notes: "Humana PPO plans cover specialists without a referral; Humana HMO plans need one.",
    },
];

pub const UNRECOGNIZED_INSURER_MESSAGE: &str = "I'm sorry, I don't recognize that insurance provider. \
    Please check the name on your insurance card, or contact our billing team and we'll verify your coverage.";

/// First insurer whose keyword appears in `text`, ignoring case.
pub fn find_insurer(text: &str) -> Option<&'static InsurerInfo> {
    let haystack = text.to_lowercase();
    INSURERS
        .iter()
        .find(|insurer| insurer.keywords.iter().any(|keyword| haystack.contains(keyword)))
}

pub fn insurer_for_option(value: &str) -> Option<&'static InsurerInfo> {
    INSURERS.iter().find(|insurer| insurer.option_value == Some(value))
}

pub fn free_text_reply(text: &str) -> String {
    match find_insurer(text) {
        Some(insurer) => format!(
            "{} is accepted in our referral network. {}",
            insurer.name, insurer.notes
        ),
        None => UNRECOGNIZED_INSURER_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert_eq!(find_insurer("I have BCBS through work").map(|i| i.name), Some("Blue Cross Blue Shield"));
        assert_eq!(find_insurer("do you take Aetna?").map(|i| i.name), Some("Aetna"));
        assert_eq!(find_insurer("my plan is UHC choice plus").map(|i| i.name), Some("UnitedHealthcare"));
    }

    #[test]
    fn test_medicare_and_medicaid_are_distinct() {
        assert_eq!(find_insurer("medicare part b").map(|i| i.name), Some("Medicare"));
        assert_eq!(find_insurer("state medicaid").map(|i| i.name), Some("Medicaid"));
    }

    #[test]
    fn test_unknown_falls_back() {
        assert!(find_insurer("Acme Mutual").is_none());
        assert_eq!(free_text_reply("Acme Mutual"), UNRECOGNIZED_INSURER_MESSAGE);
    }

    #[test]
    fn test_templated_reply_names_insurer() {
        let reply = free_text_reply("kaiser");
        assert!(reply.starts_with("Kaiser Permanente is accepted"));
    }

    #[test]
    fn test_option_lookup() {
        assert!(insurer_for_option("medicaid").unwrap().requires_specialist_referral);
        assert!(!insurer_for_option("aetna").unwrap().requires_specialist_referral);
        assert!(insurer_for_option("none").is_none());
    }
}
