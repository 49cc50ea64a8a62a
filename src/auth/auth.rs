use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::model::role::Role;
use crate::models::Claims;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ApiError::Unauthorized("Missing token".to_string()))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(ApiError::InvalidRequest("Config missing".to_string())));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ApiError::Unauthorized("Invalid token".to_string()))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ApiError::Unauthorized("Invalid role".to_string()))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin only".to_string()))
        }
    }

    pub fn require_hr_or_admin(&self) -> ApiResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin only".to_string()))
        }
    }

    /// Admin, HR and managers may review correction requests.
    pub fn require_reviewer(&self) -> ApiResult<()> {
        if self.role.can_review() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin/Manager only".to_string()))
        }
    }

    /// Returns true if the user is an employee
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    /// Employee whose attendance this call acts on.
    ///
    /// Plain employees always act on their own linked record and may not
    /// name anyone else; staff roles must name the employee explicitly.
    pub fn acting_employee_id(&self, requested: Option<u64>) -> ApiResult<u64> {
        if self.is_employee() {
            let own = self.employee_id.ok_or_else(|| {
                ApiError::InvalidRequest("No employee record linked to this account".to_string())
            })?;
            match requested {
                Some(id) if id != own => Err(ApiError::Forbidden(
                    "You can only act on your own attendance".to_string(),
                )),
                _ => Ok(own),
            }
        } else {
            requested.or(self.employee_id).ok_or_else(|| {
                ApiError::InvalidRequest("employee_id is required".to_string())
            })
        }
    }

    /// Read access to another employee's data: staff, managers, or self.
    pub fn require_self_or_staff(&self, employee_id: u64) -> ApiResult<()> {
        if self.is_employee() && self.employee_id != Some(employee_id) {
            return Err(ApiError::Forbidden(
                "You can only view your own records".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "jdoe".to_string(),
            role,
            employee_id,
        }
    }

    #[test]
    fn employee_acts_on_own_record_only() {
        let u = user(Role::Employee, Some(42));
        assert_eq!(u.acting_employee_id(None).unwrap(), 42);
        assert_eq!(u.acting_employee_id(Some(42)).unwrap(), 42);
        assert!(matches!(
            u.acting_employee_id(Some(7)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn unlinked_employee_account_cannot_clock() {
        let u = user(Role::Employee, None);
        assert!(matches!(
            u.acting_employee_id(None),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn staff_must_name_an_employee() {
        let u = user(Role::Hr, None);
        assert_eq!(u.acting_employee_id(Some(7)).unwrap(), 7);
        assert!(matches!(
            u.acting_employee_id(None),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn reviewer_gate_admits_managers() {
        assert!(user(Role::Manager, None).require_reviewer().is_ok());
        assert!(user(Role::Employee, Some(1)).require_reviewer().is_err());
        assert!(user(Role::Manager, None).require_hr_or_admin().is_err());
    }

    #[test]
    fn self_reads_are_allowed_for_employees() {
        let u = user(Role::Employee, Some(42));
        assert!(u.require_self_or_staff(42).is_ok());
        assert!(u.require_self_or_staff(43).is_err());
        assert!(user(Role::Manager, None).require_self_or_staff(43).is_ok());
    }
}
