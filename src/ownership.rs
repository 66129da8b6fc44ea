use tracing::warn;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// A record owned by exactly one seller.
pub trait Owned {
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

/// Fails with `AccessDenied` unless `acting_user` owns `entity`.
pub fn ensure_owner<T: Owned>(entity: &T, acting_user: Uuid) -> ServiceResult<()> {
    if entity.owner_id() != acting_user {
        warn!(
            entity = T::ENTITY,
            id = %entity.id(),
            owner = %entity.owner_id(),
            %acting_user,
            "ownership check failed"
        );
        return Err(ServiceError::AccessDenied {
            entity: T::ENTITY,
            id: entity.id(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ledger {
        id: Uuid,
        owner: Uuid,
    }

    impl Owned for Ledger {
        const ENTITY: &'static str = "ledger";

        fn id(&self) -> Uuid {
            self.id
        }
        fn owner_id(&self) -> Uuid {
            self.owner
        }
    }

    #[test]
    fn owner_passes() {
        let owner = Uuid::new_v4();
        let ledger = Ledger { id: Uuid::new_v4(), owner };
        assert!(ensure_owner(&ledger, owner).is_ok());
    }

    #[test]
    fn non_owner_is_denied() {
        let ledger = Ledger { id: Uuid::new_v4(), owner: Uuid::new_v4() };
        let err = ensure_owner(&ledger, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied { entity: "ledger", id } if id == ledger.id));
    }
}
