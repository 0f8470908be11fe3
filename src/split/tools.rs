use std::path::PathBuf;

use super::error::SplitError;

/// Resolve an external program on `PATH` (or as a direct path).
pub fn locate_tool(program: &str) -> Result<PathBuf, SplitError> {
    which::which(program).map_err(|err| SplitError::ToolUnavailable {
        tool: program.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_program_is_unavailable() {
        let err = locate_tool("splitparts-definitely-missing-tool").unwrap_err();
        match err {
            SplitError::ToolUnavailable { tool, .. } => {
                assert_eq!(tool, "splitparts-definitely-missing-tool")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
