use anyhow::Context;
use verity_session::SubmitOutcome;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PredictArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::output::view::PredictionPanel;
use crate::progress::Progress;

/// Handle `verity predict`.
pub async fn handle(args: &PredictArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = ctx.session()?;
    session.set_input(args.joined());

    let spinner = Progress::spinner("Scanning...");
    let outcome = session.submit().await;

    match outcome {
        SubmitOutcome::Succeeded(result) => {
            spinner.finish_clear();
            output(&PredictionPanel::from(&result), flags.format)
        }
        SubmitOutcome::Failed(error) => {
            spinner.finish_err("failed");
            Err(error).context("Backend not reachable")
        }
        SubmitOutcome::Rejected(error) => {
            spinner.finish_clear();
            Err(error).context("nothing to classify")
        }
        SubmitOutcome::Ignored | SubmitOutcome::Cancelled => {
            spinner.finish_clear();
            anyhow::bail!("prediction was abandoned")
        }
    }
}
