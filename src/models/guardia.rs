use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Profile of a security guard to provision through `createSecurityUser`.
///
/// Serialized unchanged as the remote function's argument.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGuardiaRequest {
    pub nombre: String,
    #[serde(default)]
    pub apellido_paterno: String,
    #[serde(default)]
    pub apellido_materno: String,
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub residencial_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turno: Option<Turno>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Turno {
    Matutino,
    Vespertino,
    Nocturno,
}

/// Documents addressable for deletion, scoped under their residential unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentRef {
    AreaComun { residencial_id: String, id: String },
    Guardia { residencial_id: String, id: String },
}

/// Rejects IDs the document store would resolve outside their collection or
/// reserves for itself: empty, `.`, `..`, containing `/`, or `__*__`.
fn check_segment(field: &str, value: &str) -> Result<(), AppError> {
    let reserved = value.len() >= 4 && value.starts_with("__") && value.ends_with("__");
    if value.is_empty() || value == "." || value == ".." || value.contains('/') || reserved {
        return Err(AppError::Validation(format!("Invalid {}: {:?}", field, value)));
    }
    Ok(())
}

impl DocumentRef {
    pub fn area_comun(residencial_id: String, id: String) -> Result<Self, AppError> {
        let doc = DocumentRef::AreaComun { residencial_id, id };
        doc.validate()?;
        Ok(doc)
    }

    pub fn guardia(residencial_id: String, id: String) -> Result<Self, AppError> {
        let doc = DocumentRef::Guardia { residencial_id, id };
        doc.validate()?;
        Ok(doc)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let (residencial_id, id) = match self {
            DocumentRef::AreaComun { residencial_id, id } | DocumentRef::Guardia { residencial_id, id } => {
                (residencial_id, id)
            }
        };
        check_segment("residencialId", residencial_id)?;
        check_segment("id", id)
    }

    /// Path relative to the database's `documents` root, segments
    /// percent-encoded. Only meaningful for a reference that passed
    /// [`DocumentRef::validate`].
    pub fn path(&self) -> String {
        let (residencial_id, collection, id) = match self {
            DocumentRef::AreaComun { residencial_id, id } => (residencial_id, "areasComunes", id),
            DocumentRef::Guardia { residencial_id, id } => (residencial_id, "guardias", id),
        };
        format!(
            "residenciales/{}/{}/{}",
            urlencoding::encode(residencial_id),
            collection,
            urlencoding::encode(id)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DocumentRef::AreaComun { .. } => "area_comun",
            DocumentRef::Guardia { .. } => "guardia",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_paths() {
        let area = DocumentRef::area_comun("res1".to_string(), "alberca".to_string()).unwrap();
        assert_eq!(area.path(), "residenciales/res1/areasComunes/alberca");

        let guardia = DocumentRef::guardia("res 1".to_string(), "g-7".to_string()).unwrap();
        assert_eq!(guardia.path(), "residenciales/res%201/guardias/g-7");
    }

    #[test]
    fn test_ids_that_escape_or_are_reserved_are_rejected() {
        for bad in ["", ".", "..", "g/../x", "a/b", "__name__", "____"] {
            let as_id = DocumentRef::guardia("res1".to_string(), bad.to_string());
            assert!(matches!(as_id, Err(AppError::Validation(_))), "id {:?} accepted", bad);

            let as_parent = DocumentRef::area_comun(bad.to_string(), "alberca".to_string());
            assert!(matches!(as_parent, Err(AppError::Validation(_))), "residencialId {:?} accepted", bad);
        }

        for ok in ["...", "__x", "x__", "_id_", "g.7"] {
            assert!(DocumentRef::guardia("res1".to_string(), ok.to_string()).is_ok(), "id {:?} rejected", ok);
        }
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<CreateGuardiaRequest, _> = serde_json::from_value(serde_json::json!({
            "nombre": "Luis",
            "email": "luis@example.com",
            "residencialId": "res1",
            "isGlobalAdmin": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_password_omitted_from_payload_when_absent() {
        let request: CreateGuardiaRequest = serde_json::from_value(serde_json::json!({
            "nombre": "Luis",
            "email": "luis@example.com",
            "residencialId": "res1",
            "turno": "nocturno"
        }))
        .unwrap();
        assert_eq!(request.password, None);
        assert_eq!(request.turno, Some(Turno::Nocturno));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["apellidoPaterno"], "");
    }
}
