use crate::error::Result;
use crate::streams::Stream;
use crate::streams::generators::{SeaConfig, SeaGenerator};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StreamKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum StreamChoice {
    #[strum_discriminants(strum(
        message = "SEA Generator",
        detailed_message = "Generates SEA concept functions."
    ))]
    SeaGenerator(SeaConfig),
}

pub fn build_stream(choice: StreamChoice) -> Result<Box<dyn Stream>> {
    match choice {
        StreamChoice::SeaGenerator(p) => Ok(Box::new(SeaGenerator::new(p)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::generators::SeaFunction;

    #[test]
    fn builds_a_bounded_sea_stream() {
        let choice = StreamChoice::SeaGenerator(SeaConfig {
            function: SeaFunction::F3,
            max_instances: Some(3),
            ..SeaConfig::default()
        });
        let mut stream = build_stream(choice).unwrap();
        assert_eq!(stream.n_features(), 3);

        let mut seen = 0;
        while stream.next_record().is_some() {
            seen += 1;
        }
        assert_eq!(seen, 3);
        assert!(!stream.has_more_instances());
    }
}
