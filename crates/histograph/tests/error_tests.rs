//! Tests for core error types

use histograph::core::GraphError;

#[test]
fn test_duplicate_errors() {
    let msg = GraphError::duplicate_node("napoleon").to_string();
    assert!(msg.contains("Duplicate node"));
    assert!(msg.contains("napoleon"));

    let msg = GraphError::duplicate_edge("ea-b").to_string();
    assert!(msg.contains("Duplicate edge"));
    assert!(msg.contains("ea-b"));
}

#[test]
fn test_dangling_edge() {
    let msg = GraphError::dangling_edge("ea-ghost", "ghost").to_string();
    assert!(msg.contains("ea-ghost"));
    assert!(msg.contains("ghost"));
}

#[test]
fn test_invalid_connection() {
    let error = GraphError::invalid_connection("A", "A");
    assert_eq!(error.to_string(), "Invalid connection: A -> A");
}

#[test]
fn test_lookup_errors() {
    assert!(GraphError::unknown_node("x").to_string().contains("Unknown node"));
    assert!(GraphError::unknown_edge("y").to_string().contains("Unknown edge"));
}

#[test]
fn test_errors_convert_to_anyhow() {
    fn fails() -> anyhow::Result<()> {
        Err(GraphError::self_loop("A"))?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(err.to_string().contains("Self-loop"));
    assert!(err.downcast_ref::<GraphError>().is_some());
}
