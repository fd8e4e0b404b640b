/*
 * Responsibility
 * - Actors request/response DTOs
 * - Field validation (shape checks) via validate()
 */
use serde::{Deserialize, Serialize};

use crate::repos::store::{ActorPatch, ActorRecord, NewActor};

#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

impl CreateActorRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if !(0..=150).contains(&self.age) {
            return Err("age is out of range");
        }
        if self.gender.trim().is_empty() {
            return Err("gender is required");
        }

        Ok(())
    }

    pub fn into_new(self) -> NewActor {
        NewActor {
            name: self.name,
            age: self.age,
            gender: self.gender,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl UpdateActorRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(age) = self.age
            && !(0..=150).contains(&age)
        {
            return Err("age is out of range");
        }
        if let Some(gender) = &self.gender
            && gender.trim().is_empty()
        {
            return Err("gender cannot be empty");
        }

        Ok(())
    }

    pub fn into_patch(self) -> ActorPatch {
        ActorPatch {
            name: self.name,
            age: self.age,
            gender: self.gender,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

impl From<&ActorRecord> for ActorResponse {
    fn from(record: &ActorRecord) -> Self {
        ActorResponse {
            id: record.id,
            name: record.name.clone(),
            age: record.age,
            gender: record.gender.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorListResponse {
    pub success: bool,
    pub actors: Vec<ActorResponse>,
    pub total_actors: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateActorResponse {
    pub success: bool,
    pub created_actor_id: i64,
    pub actors: Vec<ActorResponse>,
    pub total_actors: usize,
}

#[derive(Debug, Serialize)]
pub struct EditActorResponse {
    pub success: bool,
    pub edited_actor_id: i64,
    pub actors: Vec<ActorResponse>,
    pub total_actors: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteActorResponse {
    pub success: bool,
    pub deleted_actor_id: i64,
    pub actors: Vec<ActorResponse>,
    pub total_actors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_non_blank_fields() {
        let ok = CreateActorRequest {
            name: "Uma".to_string(),
            age: 35,
            gender: "female".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank_name = CreateActorRequest {
            name: "   ".to_string(),
            age: 35,
            gender: "female".to_string(),
        };
        assert!(blank_name.validate().is_err());

        let bad_age = CreateActorRequest {
            name: "Uma".to_string(),
            age: -1,
            gender: "female".to_string(),
        };
        assert!(bad_age.validate().is_err());
    }

    #[test]
    fn update_allows_absent_fields_but_not_blank_ones() {
        let empty = UpdateActorRequest {
            name: None,
            age: None,
            gender: None,
        };
        assert!(empty.validate().is_ok());

        let blank = UpdateActorRequest {
            name: Some(String::new()),
            age: None,
            gender: None,
        };
        assert!(blank.validate().is_err());
    }
}
