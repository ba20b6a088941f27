use crate::output::Output;
use super::AppContext;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub fn run_state(ctx: &AppContext, reset: bool, output: &Output) -> Result<()> {
    let store = ctx.state_store();

    if reset {
        store.reset().map_err(|e| eyre!("{}", e))?;
        output.success(format!("State reset at {}", store.path().display()));
        return Ok(());
    }

    let (state, exists) = match store.try_load() {
        Ok(Some(state)) => (state, true),
        Ok(None) => (Default::default(), false),
        Err(e) => {
            output.warn(format!("{}; showing defaults", e));
            (Default::default(), true)
        }
    };

    if !output.is_human() {
        output.data(&json!({
            "path": store.path(),
            "exists": exists,
            "state": state,
        }));
        return Ok(());
    }

    output.info(format!("State file:   {}", store.path().display()));
    if !exists {
        output.info("(no state file yet, defaults shown)");
    }
    output.info(format!("Last status:  {}", state.last_status));
    output.info(format!(
        "Last seen at: {}",
        state
            .last_seen_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    ));
    if let Some(error) = &state.last_error {
        output.info(format!("Last error:   {}", error));
    }
    Ok(())
}
