//! The team roster.

use onboard_forms::{schemas, FormPayload, FormValues, Schema};
use serde::{Deserialize, Serialize};

use crate::error::TeamError;
use crate::roles::DEFAULT_ROLES;

/// Fields of a member as entered in the add / edit dialogs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: String,
}

impl FormPayload for NewMember {
    fn to_values(&self) -> FormValues {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
            ("role", &self.role),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: String,
}

impl TeamMember {
    fn from_new(id: u64, member: NewMember) -> Self {
        Self {
            id,
            name: member.name,
            email: member.email,
            phone_number: member.phone_number,
            role: member.role,
        }
    }

    /// Case-insensitive substring match on name, email, phone or role.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [&self.name, &self.email, &self.phone_number, &self.role]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Members in insertion order. Ids start at 1 and are never reused.
#[derive(Clone, Debug)]
pub struct TeamRoster {
    members: Vec<TeamMember>,
    next_id: u64,
    roles: Vec<String>,
    schema: Schema,
}

impl TeamRoster {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        Self {
            members: Vec::new(),
            next_id: 1,
            schema: schemas::team_member(roles.iter().cloned()),
            roles,
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn validate(&self, member: &NewMember) -> Result<(), TeamError> {
        self.schema
            .validate_payload(member)
            .map_err(TeamError::Validation)
    }

    pub fn add(&mut self, member: NewMember) -> Result<u64, TeamError> {
        self.validate(&member)?;
        let id = self.next_id;
        self.next_id += 1;
        self.members.push(TeamMember::from_new(id, member));
        tracing::debug!(id, "team member added");
        Ok(id)
    }

    pub fn update(&mut self, id: u64, member: NewMember) -> Result<&TeamMember, TeamError> {
        self.validate(&member)?;
        let slot = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TeamError::NotFound(id))?;
        *slot = TeamMember::from_new(id, member);
        tracing::debug!(id, "team member updated");
        Ok(&*slot)
    }

    pub fn remove(&mut self, id: u64) -> Result<TeamMember, TeamError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or(TeamError::NotFound(id))?;
        tracing::debug!(id, "team member removed");
        Ok(self.members.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Members matching `query`; the empty query returns everyone.
    pub fn filter(&self, query: &str) -> Vec<&TeamMember> {
        let query = query.trim();
        self.members
            .iter()
            .filter(|m| query.is_empty() || m.matches(query))
            .collect()
    }
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self::new(DEFAULT_ROLES.iter().copied())
    }
}
