use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A trait for custom editor models that can be converted into a roteiro `FlowDefinition`.
///
/// This is the extension point that keeps the engine independent of any one editor's
/// export format. Implement it on the structs you deserialize your format into and the
/// graph loader can take it from there.
///
/// # Example
///
/// ```rust,no_run
/// use roteiro::prelude::*;
/// use roteiro::error::FlowConversionError;
///
/// struct CanvasNode { id: String, kind: String, data: serde_json::Value }
/// struct CanvasExport { nodes: Vec<CanvasNode> }
///
/// impl IntoFlow for CanvasExport {
///     fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
///         let nodes = self
///             .nodes
///             .into_iter()
///             .map(|n| FlowNodeDefinition::new(n.id, n.kind, n.data))
///             .collect();
///         Ok(FlowDefinition { id: None, nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a roteiro flow definition.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}

impl IntoFlow for FlowDefinition {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        Ok(self)
    }
}
