use serde::{Deserialize, Serialize};

/// Тип измерительного канала
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Электрический канал
    E,
    /// Магнитный канал
    H,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::E => "E",
            ChannelType::H => "H",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
