use super::ListId;
use crate::ApiRequest;
use std::{
    convert::{TryFrom, TryInto},
    error::Error,
    fmt::Display,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ParamsBuilder")]
#[non_exhaustive]
pub struct Params {
    pub id: ListId,
    pub name: String,
}

impl Params {
    /// ## Error
    /// * If `name` is missing, empty or whitespace.
    pub fn new(id: ListId, name: Option<String>) -> Result<Self, InvalidParams> {
        let name = name
            .and_then(crate::non_blank)
            .ok_or(InvalidParams::NameEmptyOrWhitespace)?;

        Ok(Self { id, name })
    }
}

impl TryFrom<ApiRequest> for Params {
    type Error = InvalidParams;

    fn try_from(request: ApiRequest) -> Result<Self, Self::Error> {
        let builder: ParamsBuilder =
            serde_json::from_value(request.params).map_err(InvalidParams::InvalidFormat)?;

        builder.try_into()
    }
}

impl TryFrom<ParamsBuilder> for Params {
    type Error = InvalidParams;

    fn try_from(builder: ParamsBuilder) -> Result<Self, Self::Error> {
        Self::new(builder.id, builder.name)
    }
}

#[derive(serde::Deserialize)]
struct ParamsBuilder {
    id: ListId,
    name: Option<String>,
}

#[derive(Debug)]
pub enum InvalidParams {
    InvalidFormat(serde_json::Error),
    NameEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::InvalidFormat(serde_error) => {
                crate::invalid_params_serde_message(&serde_error)
            }
            InvalidParams::NameEmptyOrWhitespace => crate::empty_value_message("name"),
        };

        write!(f, "{}", output)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct MethodResult {
    pub id: ListId,
    pub name: String,
}

impl MethodResult {
    pub fn new(id: ListId, name: String) -> Self {
        Self { id, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;

    #[test]
    fn missing_name_test() {
        let id = ListId::new_v4();
        let invalids = [
            serde_json::json!({ "id": id }),
            serde_json::json!({ "id": id, "name": "" }),
            serde_json::json!({ "id": id, "name": " \t" }),
        ];

        for invalid in &invalids {
            let request = ApiRequest::new(Operation::RenameList, invalid);
            match Params::try_from(request) {
                Err(InvalidParams::NameEmptyOrWhitespace) => (),
                other => panic!("unexpected result for {:?}: {:?}", invalid, other),
            }
        }
    }

    #[test]
    fn trims_name_test() {
        let params = Params::new(ListId::new_v4(), Some("  Trip ".to_owned())).unwrap();
        assert_eq!(params.name, "Trip");
    }
}
