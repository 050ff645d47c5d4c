use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::net::{
    PetriNet,
    marking::Marking,
    pnml,
    spec::{self, ToSpecFormat},
};

/// A net together with the marking it starts in. This is what the loaders
/// produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializedNet {
    pub net: PetriNet,
    pub initial_marking: Marking,
}

impl InitializedNet {
    pub fn new(net: PetriNet, initial_marking: Marking) -> Self {
        assert_eq!(
            initial_marking.place_count(),
            net.place_count(),
            "Initial marking has to cover every place of the net"
        );

        Self {
            net,
            initial_marking,
        }
    }

    /// Checks the vector lengths of a net that did not go through
    /// [InitializedNet::new], e.g. one read from JSON.
    pub fn validate(&self) -> anyhow::Result<()> {
        let place_count = self.net.place_count();

        if self.initial_marking.place_count() != place_count {
            anyhow::bail!(
                "Initial marking has {} entries, but the net has {} places",
                self.initial_marking.place_count(),
                place_count
            );
        }

        for (id, transition) in self.net.iter_transitions() {
            if transition.pre().len() != place_count || transition.post().len() != place_count {
                anyhow::bail!(
                    "Transition {} ('{}') does not cover all {} places",
                    id,
                    transition.name(),
                    place_count
                );
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let net: Self = serde_json::from_str(json)?;
        net.validate()?;
        Ok(net)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        Ok(std::fs::write(path, self.to_json()?)?)
    }

    pub fn to_spec_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        Ok(std::fs::write(path, self.to_spec_format())?)
    }

    /// Loads a net, picking the format from the file extension: `.pnml`,
    /// `.spec` or `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read net file {}", path.display()))?;

        let net = match path.extension().and_then(|ext| ext.to_str()) {
            Some("pnml") => pnml::parse_pnml(&content),
            Some("spec") => spec::parse_spec(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(anyhow::anyhow!(
                "Unsupported file extension: {:?}",
                path.extension()
            )),
        };

        net.with_context(|| format!("failed to load net from {}", path.display()))
    }
}
