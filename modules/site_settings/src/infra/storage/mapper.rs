//! Entity to store record mappers

use super::entity;
use crate::domain::repository::StoredSettings;

impl TryFrom<entity::Model> for StoredSettings {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            revision: revision_from_db(entity.revision)?,
            data: entity.data,
            updated_at: entity.updated_at,
        })
    }
}

pub(crate) fn revision_from_db(revision: i64) -> anyhow::Result<u64> {
    u64::try_from(revision)
        .map_err(|_| anyhow::anyhow!("negative revision {} in database", revision))
}

pub(crate) fn revision_to_db(revision: u64) -> anyhow::Result<i64> {
    i64::try_from(revision).map_err(|_| anyhow::anyhow!("revision {} out of range", revision))
}
