#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Manager = 3,
    Employee = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Manager),
            4 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Admin and HR manage policy and shift assignments.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    /// Roles allowed to review correction requests.
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::Hr));
        assert_eq!(Role::from_id(3), Some(Role::Manager));
        assert_eq!(Role::from_id(4), Some(Role::Employee));
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn reviewer_set_excludes_employees() {
        assert!(Role::Admin.can_review());
        assert!(Role::Hr.can_review());
        assert!(Role::Manager.can_review());
        assert!(!Role::Employee.can_review());
        assert!(!Role::Manager.is_staff());
    }
}
