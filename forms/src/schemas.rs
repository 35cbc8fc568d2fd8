//! The schemas used by the login, signup, onboarding and team forms.

use onboard_types::{ChannelKind, LoginIdentity, OnboardingPayload, SignupPayload};

use crate::schema::{FieldSpec, FormPayload, FormValues, Rule, Schema};

pub const PHONE_DIGITS: usize = 10;

fn phone_field(name: &str) -> FieldSpec {
    FieldSpec::new(name)
        .rule(Rule::min_len(PHONE_DIGITS, "Enter valid phone number"))
        .rule(Rule::max_len(PHONE_DIGITS, "Enter 10 digits"))
        .rule(Rule::digits("Phone number must contain digits only"))
}

fn email_field(name: &str) -> FieldSpec {
    FieldSpec::new(name).rule(Rule::email("Invalid email"))
}

/// Format check for a verification channel's target.
pub fn channel_target(kind: ChannelKind) -> Schema {
    let spec = match kind {
        ChannelKind::Phone => phone_field(kind.field_name()),
        ChannelKind::Email => email_field(kind.field_name()),
    };
    Schema::new().field(spec)
}

/// Login step one: phone plus the society picked in the selector.
pub fn login_identity() -> Schema {
    Schema::new()
        .field(phone_field("phone"))
        .field(FieldSpec::new("society").rule(Rule::min_len(1, "Select your society")))
}

/// A one-time code of `length` digits, under the field name `code`.
pub fn one_time_code(length: usize) -> Schema {
    let message = format!("OTP must be {length} digits");
    Schema::new().field(
        FieldSpec::new("code")
            .rule(Rule::exact_len(length, message.clone()))
            .rule(Rule::digits(message)),
    )
}

pub fn signup() -> Schema {
    Schema::new()
        .field(FieldSpec::new("name").rule(Rule::min_len(2, "Name is too short")))
        .field(
            FieldSpec::new("phone")
                .rule(Rule::min_len(PHONE_DIGITS, "Phone is required"))
                .rule(Rule::digits("Phone number must contain digits only")),
        )
        .field(email_field("email"))
}

pub fn onboarding() -> Schema {
    Schema::new()
        .field(FieldSpec::new("society_name").rule(Rule::min_len(3, "Society name is required")))
        .field(FieldSpec::new("subdomain").rule(Rule::min_len(3, "Subdomain is required")))
        .field(FieldSpec::new("country").rule(Rule::min_len(1, "Country is required")))
        .field(FieldSpec::new("state").rule(Rule::min_len(1, "State is required")))
        .field(FieldSpec::new("city").rule(Rule::min_len(1, "City is required")))
        .field(FieldSpec::new("zipcode").rule(Rule::min_len(4, "Zipcode is required")))
}

/// Team member dialog: every field filled, role drawn from `roles`.
pub fn team_member<I, S>(roles: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    const FILL_ALL: &str = "Please fill in all fields";
    Schema::new()
        .field(FieldSpec::new("name").rule(Rule::required(FILL_ALL)))
        .field(
            FieldSpec::new("email")
                .rule(Rule::required(FILL_ALL))
                .rule(Rule::email("Invalid email")),
        )
        .field(FieldSpec::new("phone_number").rule(Rule::required(FILL_ALL)))
        .field(
            FieldSpec::new("role")
                .rule(Rule::required(FILL_ALL))
                .rule(Rule::one_of(roles, "Select a valid role")),
        )
}

fn values<const N: usize>(pairs: [(&str, &str); N]) -> FormValues {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl FormPayload for LoginIdentity {
    fn to_values(&self) -> FormValues {
        values([
            ("phone", self.phone.as_str()),
            ("society", self.society.as_str()),
        ])
    }
}

impl FormPayload for SignupPayload {
    fn to_values(&self) -> FormValues {
        values([
            ("name", self.name.as_str()),
            ("phone", self.phone.as_str()),
            ("email", self.email.as_str()),
        ])
    }
}

impl FormPayload for OnboardingPayload {
    fn to_values(&self) -> FormValues {
        values([
            ("society_name", self.society_name.as_str()),
            ("subdomain", self.subdomain.as_str()),
            ("country", self.country.as_str()),
            ("state", self.state.as_str()),
            ("city", self.city.as_str()),
            ("zipcode", self.zipcode.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_identity_requires_ten_digit_phone_and_society() {
        let ok = LoginIdentity {
            phone: "9876543210".into(),
            society: "pragati-credit-society".into(),
        };
        assert!(login_identity().validate_payload(&ok).is_ok());

        let bad = LoginIdentity {
            phone: "98765".into(),
            society: String::new(),
        };
        let errs = login_identity().validate_payload(&bad).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].message, "Enter valid phone number");
        assert_eq!(errs[1].message, "Select your society");
    }

    #[test]
    fn login_phone_rejects_eleven_digits() {
        let id = LoginIdentity {
            phone: "98765432101".into(),
            society: "x".into(),
        };
        let errs = login_identity().validate_payload(&id).unwrap_err();
        assert_eq!(errs[0].message, "Enter 10 digits");
    }

    #[test]
    fn signup_checks_name_phone_email() {
        let payload = SignupPayload {
            name: "A".into(),
            phone: "12345".into(),
            email: "nope".into(),
        };
        let errs = signup().validate_payload(&payload).unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "phone", "email"]);
    }

    #[test]
    fn onboarding_accepts_complete_payload() {
        let payload = OnboardingPayload {
            society_name: "Pragati".into(),
            subdomain: "pragati".into(),
            country: "IN".into(),
            state: "MH".into(),
            city: "Pune".into(),
            zipcode: "411001".into(),
        };
        assert!(onboarding().validate_payload(&payload).is_ok());

        let short_zip = OnboardingPayload {
            zipcode: "411".into(),
            ..payload
        };
        let errs = onboarding().validate_payload(&short_zip).unwrap_err();
        assert_eq!(errs, vec![crate::FieldError::new("zipcode", "Zipcode is required")]);
    }

    #[test]
    fn channel_target_uses_kind_specific_rules() {
        let mut v = FormValues::new();
        v.insert("email".into(), "someone@example.com".into());
        assert!(channel_target(ChannelKind::Email).validate(&v).is_ok());

        v.insert("phone".into(), "98765x3210".into());
        assert!(channel_target(ChannelKind::Phone).validate(&v).is_err());
    }

    #[test]
    fn one_time_code_length_follows_argument() {
        let mut v = FormValues::new();
        v.insert("code".into(), "1234".into());
        assert!(one_time_code(4).validate(&v).is_ok());
        assert!(one_time_code(6).validate(&v).is_err());
    }

    #[test]
    fn team_member_role_must_be_known() {
        let schema = team_member(["QA Engineer"]);
        let mut v = values([
            ("name", "Asha"),
            ("email", "asha@example.com"),
            ("phone_number", "9876543210"),
            ("role", "Astronaut"),
        ]);
        let errs = schema.validate(&v).unwrap_err();
        assert_eq!(errs[0].field, "role");

        v.insert("role".into(), "QA Engineer".into());
        assert!(schema.validate(&v).is_ok());
    }
}
