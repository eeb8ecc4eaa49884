use bytes::Bytes;
use tracing::{debug, trace};

use crate::{
    call_frame::{CallFrame, ExecutionContext},
    environment::{OvmConfig, RevertPropagation},
    errors::{ExecutionOutcome, InternalError, RevertReason, Status, VMError},
    message_record::MessageRecord,
    state_store::{Checkpoint, StateStore},
};

/// How a frame ended, before the engine turns it into an [`ExecutionOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameExit {
    Success(Bytes),
    Revert { reason: RevertReason, value: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutput {
    pub exit: FrameExit,
    pub children: Vec<ExecutionOutcome>,
    /// Set when the handler already rolled the store back to the point it
    /// wants to keep, so the engine must not restore the frame checkpoint.
    pub state_restored: bool,
}

impl FrameOutput {
    pub fn success(value: Bytes) -> Self {
        Self {
            exit: FrameExit::Success(value),
            children: Vec::new(),
            state_restored: false,
        }
    }

    pub fn revert(reason: RevertReason) -> Self {
        Self::revert_with_value(reason, Bytes::new())
    }

    pub fn revert_with_value(reason: RevertReason, value: Bytes) -> Self {
        Self {
            exit: FrameExit::Revert { reason, value },
            children: Vec::new(),
            state_restored: false,
        }
    }

    pub fn with_children(mut self, children: Vec<ExecutionOutcome>) -> Self {
        self.children = children;
        self
    }
}

/// What a handler decided to do with its frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Finished(FrameOutput),
    /// The frame runs its sub-steps before it finishes.
    Run(FrameBody),
}

/// Sub-step progress of a call or create frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBody {
    /// Context the sub-steps execute in.
    pub context: ExecutionContext,
    /// Returned when every sub-step ran without a propagating revert.
    pub success_value: Bytes,
    /// On revert the store goes back here instead of the frame checkpoint.
    pub rollback_to: Option<Checkpoint>,
    next_sub_step: usize,
    children: Vec<ExecutionOutcome>,
    propagated: Option<(RevertReason, Bytes)>,
}

impl FrameBody {
    pub fn new(context: ExecutionContext, success_value: Bytes) -> Self {
        Self {
            context,
            success_value,
            rollback_to: None,
            next_sub_step: 0,
            children: Vec::new(),
            propagated: None,
        }
    }

    pub fn rolling_back_to(mut self, checkpoint: Checkpoint) -> Self {
        self.rollback_to = Some(checkpoint);
        self
    }
}

/// A frame on the engine's call stack.
struct ActiveFrame<'f> {
    frame: &'f CallFrame,
    context: ExecutionContext,
    checkpoint: Checkpoint,
    depth: usize,
    /// Context handed to the sub-steps, once the frame opened one.
    sub_context: Option<ExecutionContext>,
    body: Option<FrameBody>,
}

enum Advance<'f> {
    Enter(&'f CallFrame, ExecutionContext),
    Finished(FrameOutput),
}

pub struct Engine<'a> {
    pub config: &'a OvmConfig,
    pub db: &'a mut StateStore,
    pub message_record: MessageRecord,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a OvmConfig, db: &'a mut StateStore, message_record: MessageRecord) -> Self {
        Self {
            config,
            db,
            message_record,
        }
    }

    /// Executes a root frame in the entrypoint context.
    ///
    /// On success every mutation is committed to the store. A fatal error
    /// leaves the store as it was before the call.
    pub fn execute(&mut self, root: &CallFrame) -> Result<ExecutionOutcome, VMError> {
        let context = ExecutionContext::root(self.config);
        let checkpoint = self.db.checkpoint();

        match self.execute_frame(root, &context) {
            Ok(outcome) => {
                self.db.commit();
                debug!(
                    kind = %outcome.kind,
                    success = outcome.is_success(),
                    nuisance_gas_used = outcome.nuisance_gas_used,
                    frames = outcome.frame_count(),
                    "Executed root frame"
                );
                Ok(outcome)
            }
            Err(error) => {
                debug!(%error, "Execution aborted");
                self.db.revert_to(checkpoint)?;
                Err(error)
            }
        }
    }

    /// Runs one frame and its descendants.
    ///
    /// Nested frames live on an explicit stack, so the native stack does not
    /// grow with the call depth.
    pub fn execute_frame(
        &mut self,
        frame: &CallFrame,
        context: &ExecutionContext,
    ) -> Result<ExecutionOutcome, VMError> {
        let mut call_frames = vec![self.enter_frame(frame, *context)?];

        loop {
            let current = call_frames
                .last_mut()
                .ok_or(InternalError::CouldNotPopCallframe)?;
            let output = match self.advance(current)? {
                Advance::Enter(child, child_context) => {
                    let child = self.enter_frame(child, child_context)?;
                    call_frames.push(child);
                    continue;
                }
                Advance::Finished(output) => output,
            };

            let finished = call_frames
                .pop()
                .ok_or(InternalError::CouldNotPopCallframe)?;
            let outcome = self.exit_frame(finished, output)?;

            // The first frame has no parent to report to.
            match call_frames.last_mut() {
                Some(parent) => self.handle_return(parent, outcome)?,
                None => return Ok(outcome),
            }
        }
    }

    fn enter_frame<'f>(
        &mut self,
        frame: &'f CallFrame,
        context: ExecutionContext,
    ) -> Result<ActiveFrame<'f>, VMError> {
        let checkpoint = self.db.checkpoint();
        let depth = self
            .message_record
            .enter_call(frame.operation.nuisance_gas_limit());
        if depth > self.config.max_call_depth {
            return Err(VMError::CallDepthExceeded {
                depth,
                max: self.config.max_call_depth,
            });
        }
        trace!(kind = %frame.kind(), depth, address = ?context.address, "Entering frame");

        Ok(ActiveFrame {
            frame,
            context,
            checkpoint,
            depth,
            sub_context: None,
            body: None,
        })
    }

    /// Dispatches a fresh frame, or moves a running one to its next sub-step.
    fn advance<'f>(&mut self, current: &mut ActiveFrame<'f>) -> Result<Advance<'f>, VMError> {
        let frame = current.frame;
        let mut body = match current.body.take() {
            Some(body) => body,
            None => match self.dispatch(frame, &current.context)? {
                Dispatch::Finished(output) => return Ok(Advance::Finished(output)),
                Dispatch::Run(body) => {
                    current.sub_context = Some(body.context);
                    body
                }
            },
        };

        let next_sub_step = match body.propagated {
            Some(_) => None,
            None => frame.sub_steps.get(body.next_sub_step),
        };
        if let Some(sub_step) = next_sub_step {
            body.next_sub_step += 1;
            let context = body.context;
            current.body = Some(body);
            return Ok(Advance::Enter(sub_step, context));
        }
        self.finish_body(body).map(Advance::Finished)
    }

    fn finish_body(&mut self, body: FrameBody) -> Result<FrameOutput, VMError> {
        let output = match body.propagated {
            Some((reason, value)) => {
                let mut output = FrameOutput::revert_with_value(reason, value);
                if let Some(checkpoint) = body.rollback_to {
                    self.db.revert_to(checkpoint)?;
                    output.state_restored = true;
                }
                output
            }
            None => FrameOutput::success(body.success_value),
        };
        Ok(output.with_children(body.children))
    }

    fn exit_frame(
        &mut self,
        finished: ActiveFrame<'_>,
        output: FrameOutput,
    ) -> Result<ExecutionOutcome, VMError> {
        let kind = finished.frame.kind();
        let (status, value, exhausted) = match output.exit {
            FrameExit::Success(value) => (Status::Succeeded, value, false),
            FrameExit::Revert { reason, value } => {
                if !output.state_restored {
                    self.db.revert_to(finished.checkpoint)?;
                }
                let exhausted = reason == RevertReason::NuisanceGasExhausted;
                (Status::Reverted(reason), value, exhausted)
            }
        };
        let nuisance_gas_used = self.message_record.exit_call(exhausted)?;
        trace!(%kind, depth = finished.depth, ?status, nuisance_gas_used, "Exiting frame");

        Ok(ExecutionOutcome {
            kind,
            status,
            value,
            nuisance_gas_used,
            context: finished.sub_context,
            children: output.children,
        })
    }

    /// Records a finished child in its parent. A reverting child is skipped
    /// over unless its kind is configured to propagate, in which case the
    /// parent runs no further sub-steps.
    fn handle_return(
        &self,
        parent: &mut ActiveFrame<'_>,
        outcome: ExecutionOutcome,
    ) -> Result<(), VMError> {
        let body = parent
            .body
            .as_mut()
            .ok_or(InternalError::MissingFrameBody)?;
        if matches!(outcome.status, Status::Reverted(_))
            && self.config.revert_propagation_for(outcome.kind) == RevertPropagation::Propagate
        {
            body.propagated = Some((
                RevertReason::ChildReverted(outcome.kind),
                outcome.value.clone(),
            ));
        }
        body.children.push(outcome);
        Ok(())
    }

    /// Charges nuisance gas, turning a shortfall into a frame revert.
    pub fn charge_nuisance_gas(&mut self, amount: u64) -> Result<(), RevertReason> {
        self.message_record
            .charge_nuisance_gas(amount)
            .map_err(|error| {
                trace!(%error, "Out of nuisance gas");
                RevertReason::NuisanceGasExhausted
            })
    }
}
