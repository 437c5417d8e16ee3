//! Onboarding wizard state and form handling
//!
//! One [`Session`] per browser. Nothing here talks to the network; the
//! route handlers call the platform and feed the answers back in.

use karma_sdk::{
    BalanceResponse, CardLimits, CreateCardRequest, CreateCardResponse, KycAddress, KycRequest,
    KycStatus,
};
use serde::Deserialize;

pub const DEFAULT_WEB_CARD_NAME: &str = "My Agent Card";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Register,
    Kyc,
    Agreements,
    CreateCard,
    Dashboard,
}

impl WizardStep {
    /// Steps shown in the progress bar, in order
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Register,
        WizardStep::Kyc,
        WizardStep::Agreements,
        WizardStep::CreateCard,
        WizardStep::Dashboard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Register => "Register",
            WizardStep::Kyc => "KYC",
            WizardStep::Agreements => "Terms",
            WizardStep::CreateCard => "Create Card",
            WizardStep::Dashboard => "Dashboard",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Register => "Create your account",
            WizardStep::Kyc => "Verify your identity",
            WizardStep::Agreements => "Review agreements",
            WizardStep::CreateCard => "Create your agent card",
            WizardStep::Dashboard => "Dashboard",
        }
    }
}

/// Where a returning owner should land.
///
/// `None` means the lookup failed; a failed lookup lands on identity
/// verification, which re-checks on its own.
pub fn landing_step(kyc: Option<KycStatus>, terms_accepted: Option<bool>) -> WizardStep {
    match (kyc, terms_accepted) {
        (Some(status), Some(true)) if status.is_approved() => WizardStep::CreateCard,
        (Some(status), Some(false)) if status.is_approved() => WizardStep::Agreements,
        _ => WizardStep::Kyc,
    }
}

/// Everything the wizard knows about one browser
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub step: WizardStep,
    pub email: Option<String>,
    /// Masked address the one-time code went to
    pub otp_sent_to: Option<String>,
    pub owner_key: Option<String>,
    pub kyc_url: Option<String>,
    pub card: Option<CreateCardResponse>,
    pub balance: Option<BalanceResponse>,
    /// Shown once on the next render, then cleared
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Session {
    pub fn advance(&mut self, step: WizardStep) {
        self.step = step;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Owner key accepted (by registration or resume)
    pub fn signed_in(&mut self, owner_key: String, step: WizardStep) {
        self.owner_key = Some(owner_key);
        self.otp_sent_to = None;
        self.advance(step);
    }

    pub fn take_messages(&mut self) -> (Option<String>, Option<String>) {
        (self.notice.take(), self.error.take())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyForm {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeForm {
    pub owner_key: String,
}

/// Identity fields as typed into the form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KycForm {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub country: String,
    pub national_id: String,
    pub phone_code: String,
    pub phone_number: String,
    pub line1: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

impl KycForm {
    /// Check required fields and normalise phone input
    pub fn validate(&self, email: Option<String>) -> Result<KycRequest, &'static str> {
        let field = |s: &String| s.trim().to_string();

        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Name is required.");
        }
        if self.birth_date.trim().is_empty() {
            return Err("Date of birth is required.");
        }
        if self.country.trim().is_empty() {
            return Err("Country is required.");
        }
        if self.national_id.trim().is_empty() {
            return Err("National ID is required.");
        }
        if [&self.line1, &self.city, &self.region, &self.postal_code]
            .iter()
            .any(|part| part.trim().is_empty())
        {
            return Err("Full address is required.");
        }

        let country = field(&self.country).to_ascii_uppercase();
        Ok(KycRequest {
            first_name: field(&self.first_name),
            last_name: field(&self.last_name),
            email,
            birth_date: field(&self.birth_date),
            national_id: field(&self.national_id),
            country_of_issue: country.clone(),
            phone_country_code: self.phone_code.trim().trim_start_matches('+').to_string(),
            phone_number: self.phone_number.chars().filter(char::is_ascii_digit).collect(),
            address: KycAddress {
                line1: field(&self.line1),
                city: field(&self.city),
                region: field(&self.region),
                postal_code: field(&self.postal_code),
                country_code: country,
            },
            ip_address: None,
        })
    }
}

/// Checkboxes arrive only when ticked
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgreementsForm {
    pub esign: Option<String>,
    pub card_terms: Option<String>,
    pub certify: Option<String>,
    pub no_solicitation: Option<String>,
}

impl AgreementsForm {
    pub fn all_accepted(&self) -> bool {
        [
            &self.esign,
            &self.card_terms,
            &self.certify,
            &self.no_solicitation,
        ]
        .iter()
        .all(|field| field.is_some())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardForm {
    pub name: String,
    pub per_txn: String,
    pub daily: String,
    pub monthly: String,
}

impl CardForm {
    pub fn to_request(&self) -> CreateCardRequest {
        let name = match self.name.trim() {
            "" => DEFAULT_WEB_CARD_NAME,
            name => name,
        };
        CreateCardRequest::new(
            name,
            CardLimits::from_inputs(&self.per_txn, &self.daily, &self.monthly),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_kyc() -> KycForm {
        KycForm {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            birth_date: "1990-04-01".into(),
            country: "gb".into(),
            national_id: "AB123456C".into(),
            phone_code: "+44".into(),
            phone_number: "(020) 7946-0958".into(),
            line1: "1 High St".into(),
            city: "London".into(),
            region: "LDN".into(),
            postal_code: "N1 9GU".into(),
        }
    }

    #[test]
    fn test_landing_step() {
        use KycStatus::*;
        assert_eq!(landing_step(None, None), WizardStep::Kyc);
        assert_eq!(landing_step(Some(Pending), None), WizardStep::Kyc);
        assert_eq!(landing_step(Some(Pending), Some(true)), WizardStep::Kyc);
        assert_eq!(landing_step(Some(Denied), Some(false)), WizardStep::Kyc);
        assert_eq!(landing_step(Some(Approved), None), WizardStep::Kyc);
        assert_eq!(landing_step(Some(Approved), Some(false)), WizardStep::Agreements);
        assert_eq!(landing_step(Some(Approved), Some(true)), WizardStep::CreateCard);
    }

    #[test]
    fn test_kyc_form_normalises_input() {
        let request = complete_kyc().validate(Some("ann@example.com".into())).unwrap();
        assert_eq!(request.country_of_issue, "GB");
        assert_eq!(request.address.country_code, "GB");
        assert_eq!(request.phone_country_code, "44");
        assert_eq!(request.phone_number, "02079460958");
        assert_eq!(request.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_kyc_form_reports_first_missing_field() {
        let mut form = complete_kyc();
        form.city = "  ".into();
        assert_eq!(form.validate(None).unwrap_err(), "Full address is required.");

        form.national_id.clear();
        assert_eq!(form.validate(None).unwrap_err(), "National ID is required.");

        form.first_name.clear();
        assert_eq!(form.validate(None).unwrap_err(), "Name is required.");
    }

    #[test]
    fn test_agreements_need_every_box() {
        let mut form = AgreementsForm {
            esign: Some("on".into()),
            card_terms: Some("on".into()),
            certify: Some("on".into()),
            no_solicitation: None,
        };
        assert!(!form.all_accepted());
        form.no_solicitation = Some("on".into());
        assert!(form.all_accepted());
    }

    #[test]
    fn test_card_form_defaults() {
        let request = CardForm::default().to_request();
        assert_eq!(request.name, DEFAULT_WEB_CARD_NAME);
        assert_eq!(request.per_txn_limit, Some(100.0));
        assert_eq!(request.daily_limit, Some(500.0));
        assert_eq!(request.monthly_limit, Some(2000.0));

        let custom = CardForm {
            name: "Groceries".into(),
            per_txn: "25".into(),
            daily: "".into(),
            monthly: "0".into(),
        }
        .to_request();
        assert_eq!(custom.name, "Groceries");
        assert_eq!(custom.per_txn_limit, Some(25.0));
        assert_eq!(custom.monthly_limit, Some(2000.0));
    }

    #[test]
    fn test_messages_are_shown_once() {
        let mut session = Session {
            notice: Some("saved".into()),
            ..Default::default()
        };
        session.fail("boom");
        assert_eq!(session.take_messages(), (Some("saved".into()), Some("boom".into())));
        assert_eq!(session.take_messages(), (None, None));
    }
}
