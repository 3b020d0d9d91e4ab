//! Registration and profile forms

use super::{rules, FieldErrors, Pipeline, Rule};
use crate::models::{
    enums::Role,
    user::{NewAccount, ProfileForm, ProfileUpdate, RegistrationForm, UpdateRole},
};

const PERSON_NAME: &[Rule] = &[rules::no_sql_keywords, rules::no_script];

impl RegistrationForm {
    pub fn clean(self) -> Result<NewAccount, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let username = self.username.trim().to_string();
        p.check("username", rules::username(&username));
        let email = p.limited("email", &self.email, &[rules::no_script], rules::EMAIL_MAX);

        if self.password != self.password_confirm {
            p.error("password_confirm", "The two password fields didn't match.");
        }
        if self.password.eq_ignore_ascii_case(&username) {
            p.error("password", "The password is too similar to the username.");
        }

        p.finish(NewAccount {
            username,
            email: email.to_lowercase(),
            password: self.password,
        })
    }
}

impl ProfileForm {
    pub fn clean(self) -> Result<ProfileUpdate, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let first_name = self
            .first_name
            .as_deref()
            .map(|v| p.limited("first_name", v, PERSON_NAME, rules::PERSON_NAME_MAX));
        let last_name = self
            .last_name
            .as_deref()
            .map(|v| p.limited("last_name", v, PERSON_NAME, rules::PERSON_NAME_MAX));
        let email = self
            .email
            .as_deref()
            .map(|v| p.limited("email", v, &[rules::no_script], rules::EMAIL_MAX).to_lowercase());
        let bio = self.bio.as_deref().map(|v| p.text("bio", v, &[rules::no_script]));
        let website = self.website.as_deref().map(|v| {
            if v.trim().is_empty() {
                String::new()
            } else {
                p.limited("website", v, &[rules::url], rules::WEBSITE_MAX)
            }
        });

        p.finish(ProfileUpdate {
            first_name,
            last_name,
            email,
            bio,
            website,
        })
    }
}

impl UpdateRole {
    pub fn clean(self) -> Result<Role, FieldErrors> {
        self.role
            .parse::<Role>()
            .map_err(|_| FieldErrors::single("role", "Role must be one of Admin, Librarian, Member."))
    }
}
