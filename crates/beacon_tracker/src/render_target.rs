//! Where a widget is being rendered.

use beacon_loader::Activation;
use serde::{Deserialize, Serialize};

/// The context a widget instance renders in, decided by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// The design canvas.
    Canvas,
    /// A static export.
    Export,
    /// A thumbnail rendering.
    Thumbnail,
    /// A live preview, the only context where scripts load.
    Preview,
}

impl RenderTarget {
    /// Maps the render target onto loader activation.
    #[must_use]
    pub fn activation(self) -> Activation {
        match self {
            Self::Preview => Activation::Active,
            Self::Canvas | Self::Export | Self::Thumbnail => Activation::Inactive,
        }
    }
}
