use std::collections::BTreeMap;

use crate::models::{ChatOption, FlowKind, Outcome};
use crate::services::insurers::insurer_for_option;

#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub value: &'static str,
    pub label: &'static str,
}

impl OptionDef {
    pub fn to_option(&self) -> ChatOption {
        ChatOption {
            value: self.value.to_string(),
            label: self.label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub key: &'static str,
    pub prompt: &'static str,
    pub options: &'static [OptionDef],
}

const fn opt(value: &'static str, label: &'static str) -> OptionDef {
    OptionDef { value, label }
}

pub const GREETING: &str = "Hi! I'm your care assistant. How can I help you today?";
pub const RESTART_VALUE: &str = "restart";

pub const GREETING_OPTIONS: &[OptionDef] = &[
    opt("symptom_checker", "Check my symptoms"),
    opt("insurance_helper", "Help with insurance"),
];

pub const COMPLETE_OPTIONS: &[OptionDef] = &[opt(RESTART_VALUE, "Start over")];

// Step indices, shared by the tables and the analysis functions.
pub const SYMPTOM: usize = 0;
pub const SEVERITY: usize = 1;
pub const DURATION: usize = 2;
pub const ASSOCIATED: usize = 3;

pub const PROVIDER: usize = 0;
pub const CARE_TYPE: usize = 1;
pub const HAS_REFERRAL: usize = 2;

pub const SYMPTOM_STEPS: &[StepDef] = &[
    StepDef {
        key: "symptom",
        prompt: "What symptom is bothering you the most?",
        options: &[
            opt("headache", "Headache"),
            opt("chest_pain", "Chest pain"),
            opt("fever", "Fever"),
            opt("cough", "Cough"),
            opt("stomach_pain", "Stomach pain"),
            opt("back_pain", "Back pain"),
            opt("rash", "Skin rash"),
        ],
    },
    StepDef {
        key: "severity",
        prompt: "How severe is it?",
        options: &[
            opt("mild", "Mild"),
            opt("moderate", "Moderate"),
            opt("severe", "Severe"),
        ],
    },
    StepDef {
        key: "duration",
        prompt: "How long have you had it?",
        options: &[
            opt("under_24h", "Less than a day"),
            opt("few_days", "A few days"),
            opt("over_week", "More than a week"),
        ],
    },
    StepDef {
        key: "associated",
        prompt: "Are you also experiencing any of these?",
        options: &[
            opt("shortness_of_breath", "Shortness of breath"),
            opt("nausea", "Nausea"),
            opt("dizziness", "Dizziness"),
            opt("none", "None of these"),
        ],
    },
];

pub const INSURANCE_STEPS: &[StepDef] = &[
    StepDef {
        key: "provider",
        prompt: "Which insurance provider do you have?",
        options: &[
            opt("blue_cross", "Blue Cross Blue Shield"),
            opt("aetna", "Aetna"),
            opt("united", "UnitedHealthcare"),
            opt("cigna", "Cigna"),
            opt("medicare", "Medicare"),
            opt("medicaid", "Medicaid"),
            opt("none", "I don't have insurance"),
        ],
    },
    StepDef {
        key: "care_type",
        prompt: "What kind of care are you looking for?",
        options: &[
            opt("primary_care", "Primary care"),
            opt("specialist", "Specialist visit"),
            opt("emergency", "Emergency care"),
            opt("mental_health", "Mental health"),
        ],
    },
    StepDef {
        key: "has_referral",
        prompt: "Do you already have a referral from your primary care physician?",
        options: &[
            opt("yes", "Yes"),
            opt("no", "No"),
        ],
    },
];

pub type Answers = BTreeMap<usize, String>;

impl FlowKind {
    pub fn from_greeting_option(value: &str) -> Option<FlowKind> {
        match value {
            "symptom_checker" => Some(FlowKind::Symptom),
            "insurance_helper" => Some(FlowKind::Insurance),
            _ => None,
        }
    }

    pub fn steps(&self) -> &'static [StepDef] {
        match self {
            FlowKind::Symptom => SYMPTOM_STEPS,
            FlowKind::Insurance => INSURANCE_STEPS,
        }
    }

    pub fn analyze(&self, answers: &Answers) -> Outcome {
        match self {
            FlowKind::Symptom => analyze_symptoms(answers),
            FlowKind::Insurance => analyze_insurance(answers),
        }
    }
}

fn answer(answers: &Answers, step: usize) -> &str {
    answers.get(&step).map(String::as_str).unwrap_or_default()
}

/// First matching rule wins.
pub fn analyze_symptoms(answers: &Answers) -> Outcome {
    let symptom = answer(answers, SYMPTOM);
    let severity = answer(answers, SEVERITY);
    let duration = answer(answers, DURATION);
    let associated = answer(answers, ASSOCIATED);

    if severity == "severe" {
        return Outcome::UrgentCare;
    }
    if (symptom == "chest_pain" && severity == "moderate") || associated == "shortness_of_breath" {
        return Outcome::UrgentCare;
    }
    if severity == "moderate" || duration == "over_week" {
        return Outcome::PrimaryCareVisit;
    }
    Outcome::HomeCare
}

pub fn analyze_insurance(answers: &Answers) -> Outcome {
    let provider = answer(answers, PROVIDER);
    let care_type = answer(answers, CARE_TYPE);
    let has_referral = answer(answers, HAS_REFERRAL);

    if provider == "none" {
        return Outcome::SelfPay;
    }
    if care_type == "emergency" {
        return Outcome::EmergencyCovered;
    }

    let needs_referral = insurer_for_option(provider)
        .is_some_and(|insurer| insurer.requires_specialist_referral);
    if care_type == "specialist" && needs_referral && has_referral == "no" {
        return Outcome::ReferralRequired;
    }
    Outcome::Covered
}
