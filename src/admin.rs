//! Team and brand administration forms

use serde::{Deserialize, Serialize};

use crate::models::{AgencyMember, Client};
use crate::seed;

/// Input buffer of the "new team member" modal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberForm {
    pub name: String,
    pub role: String,
    pub email: String,
}

impl MemberForm {
    /// Builds the member, or `None` when name or email is missing.
    /// Email uniqueness is not checked.
    pub fn member(&self) -> Option<AgencyMember> {
        if self.name.is_empty() || self.email.is_empty() {
            return None;
        }
        Some(AgencyMember {
            name: self.name.clone(),
            role: self.role.clone(),
            email: self.email.clone(),
        })
    }
}

/// Input buffer of the "new brand" modal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandForm {
    pub name: String,
    pub industry: String,
}

impl BrandForm {
    /// Builds the brand under `id`, or `None` when the name is missing
    pub fn client(&self, id: String) -> Option<Client> {
        if self.name.is_empty() {
            return None;
        }
        let industry = if self.industry.is_empty() {
            seed::DEFAULT_INDUSTRY.to_string()
        } else {
            self.industry.clone()
        };

        Some(Client {
            id,
            name: self.name.clone(),
            logo: seed::logo_url(&self.name),
            industry,
            active_posts: 0,
            platforms: seed::DEFAULT_BRAND_PLATFORMS.to_vec(),
            brand_color: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_member_requires_name_and_email() {
        let mut form = MemberForm {
            name: "Giulia".to_string(),
            role: String::new(),
            email: String::new(),
        };
        assert!(form.member().is_none());

        form.email = "g@anusual.com".to_string();
        let member = form.member().unwrap();
        assert_eq!(member.role, "");

        form.name.clear();
        assert!(form.member().is_none());
    }

    #[test]
    fn test_brand_defaults() {
        let form = BrandForm {
            name: "Acme".to_string(),
            industry: String::new(),
        };
        let client = form.client("x1".to_string()).unwrap();

        assert_eq!(client.industry, "General");
        assert_eq!(client.active_posts, 0);
        assert_eq!(client.platforms, vec![Platform::Instagram, Platform::Facebook]);
        assert_eq!(client.logo, "https://picsum.photos/seed/Acme/100/100");
        assert!(client.brand_color.is_none());

        assert!(BrandForm::default().client("x2".to_string()).is_none());
    }
}
