use serde::Serialize;

use judge_core::assignment::Outcome;
use judge_core::entities::Assignment;
use judge_core::enums::{AssignmentState, BeginAction};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::JudgingCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AssignmentView {
    state: AssignmentState,
    prev: Option<String>,
    next: Option<String>,
}

impl From<Assignment> for AssignmentView {
    fn from(assignment: Assignment) -> Self {
        Self {
            state: assignment.state(),
            prev: assignment.prev,
            next: assignment.next,
        }
    }
}

/// Handle `jdg judging`.
pub async fn handle(
    action: &JudgingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let mut rng = rand::rng();

    let outcome = match action {
        JudgingCommands::Status { judge } => {
            let view = AssignmentView::from(svc.assignment(judge).await?);
            return output(&view, flags.format);
        }
        JudgingCommands::Next { judge } => svc.initialize_if_needed(judge, &mut rng).await?,
        JudgingCommands::Begin { judge, item, skip } => {
            let begin = if *skip {
                BeginAction::Skip
            } else {
                BeginAction::Continue
            };
            let outcome = svc.submit_begin_action(judge, item, begin, &mut rng).await?;
            // Skipping the first item leaves the judge without one; hand out
            // a replacement straight away.
            if *skip && outcome == Outcome::Waiting {
                svc.initialize_if_needed(judge, &mut rng).await?
            } else {
                outcome
            }
        }
        JudgingCommands::Vote {
            judge,
            prev,
            next,
            choice,
        } => {
            svc.submit_vote_action(judge, prev, next, (*choice).into(), &mut rng)
                .await?
        }
    };
    output(&outcome, flags.format)
}
