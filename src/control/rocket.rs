use std::fmt;

use serde::Serialize;

use super::launch_stages::Stage;
use crate::constants::MAX_STAGES;
use crate::errors::SimulationError;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize)]
pub enum NoseForm {
    Sharp,
    Round,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize)]
pub enum NoseShape {
    Undefined,
    #[default]
    Ogive,
    Conic,
    Elliptic,
    Parabolic,
    Blunt,
}

impl NoseShape {
    const ALL: [NoseShape; 6] = [
        NoseShape::Undefined,
        NoseShape::Ogive,
        NoseShape::Conic,
        NoseShape::Elliptic,
        NoseShape::Parabolic,
        NoseShape::Blunt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NoseShape::Undefined => "undefined",
            NoseShape::Ogive => "ogive",
            NoseShape::Conic => "conic",
            NoseShape::Elliptic => "elliptic",
            NoseShape::Parabolic => "parabolic",
            NoseShape::Blunt => "blunt",
        }
    }

    pub fn form(&self) -> NoseForm {
        match self {
            NoseShape::Undefined | NoseShape::Ogive | NoseShape::Conic => NoseForm::Sharp,
            NoseShape::Elliptic | NoseShape::Parabolic | NoseShape::Blunt => NoseForm::Round,
        }
    }

    pub fn find(name: &str) -> Option<NoseShape> {
        let name = name.trim().to_ascii_lowercase();
        NoseShape::ALL
            .into_iter()
            .find(|shape| shape.name().starts_with(name.as_str()))
    }
}

impl fmt::Display for NoseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rocket {
    pub name: String,
    pub nose: NoseShape,
    pub stages: Vec<Stage>,
}

impl Rocket {
    pub fn new(name: impl Into<String>, nose: NoseShape, stages: Vec<Stage>) -> Self {
        Rocket {
            name: name.into(),
            nose,
            stages,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.stages.is_empty() {
            return Err(SimulationError::ConfigurationError(
                "rocket has no stages".to_string(),
            ));
        }
        if self.stages.len() > MAX_STAGES {
            return Err(SimulationError::ConfigurationError(format!(
                "rocket has {} stages, at most {} are supported",
                self.stages.len(),
                MAX_STAGES
            )));
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.number != index + 1 {
                return Err(SimulationError::ConfigurationError(format!(
                    "stage number {} out of range at position {}",
                    stage.number,
                    index + 1
                )));
            }
            stage.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nose_lookup_by_abbreviation() {
        assert_eq!(NoseShape::find("O"), Some(NoseShape::Ogive));
        assert_eq!(NoseShape::find("conic"), Some(NoseShape::Conic));
        assert_eq!(NoseShape::find("Ell"), Some(NoseShape::Elliptic));
        assert_eq!(NoseShape::find("p"), Some(NoseShape::Parabolic));
        assert_eq!(NoseShape::find("BLUNT"), Some(NoseShape::Blunt));
        assert_eq!(NoseShape::find("x"), None);
        assert_eq!(NoseShape::find("ogives"), None);
    }

    #[test]
    fn test_nose_forms() {
        assert_eq!(NoseShape::Ogive.form(), NoseForm::Sharp);
        assert_eq!(NoseShape::Undefined.form(), NoseForm::Sharp);
        assert_eq!(NoseShape::Parabolic.form(), NoseForm::Round);
        assert_eq!(NoseShape::Blunt.to_string(), "Blunt");
    }

    #[test]
    fn test_rocket_validation() {
        let rocket = Rocket::new(
            "Two Step",
            NoseShape::Ogive,
            vec![Stage::new(1, 0.3, 0.04), Stage::new(2, 0.2, 0.025)],
        );
        assert!(rocket.validate().is_ok());
        assert_eq!(rocket.stage_count(), 2);

        let empty = Rocket::new("Nothing", NoseShape::Ogive, vec![]);
        assert!(empty.validate().is_err());

        let misnumbered = Rocket::new(
            "Out Of Order",
            NoseShape::Ogive,
            vec![Stage::new(1, 0.3, 0.04), Stage::new(3, 0.2, 0.025)],
        );
        assert!(matches!(
            misnumbered.validate(),
            Err(SimulationError::ConfigurationError(_))
        ));
    }
}
