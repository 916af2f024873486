use crate::{
    config::AcConfig,
    error::CommandError,
    types::{parse_target_temp, AcField, AcState, FieldUpdate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Transmit(AcState),
    PublishStatus(AcState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    StateChanged {
        previous: AcState,
        current: AcState,
        actions: Vec<SyncAction>,
    },
    NoChange,
}

impl CommandOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    pub fn actions(&self) -> &[SyncAction] {
        match self {
            Self::StateChanged { actions, .. } => actions,
            Self::NoChange => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcSynchronizer {
    state: AcState,
    temp_bounds: (i32, i32),
}

impl AcSynchronizer {
    pub fn new(config: &AcConfig) -> Self {
        let mut config = config.clone();
        config.sanitize();
        Self {
            state: config.initial_state,
            temp_bounds: config.target_bounds(),
        }
    }

    pub fn state(&self) -> AcState {
        self.state
    }

    pub fn validate(&self, field: AcField, raw: &str) -> Result<FieldUpdate, CommandError> {
        Ok(match field {
            AcField::Power => FieldUpdate::Power(raw.parse()?),
            AcField::Mode => FieldUpdate::Mode(raw.parse()?),
            AcField::TargetTemp => FieldUpdate::TargetTemp(parse_target_temp(raw, self.temp_bounds)?),
            AcField::Fan => FieldUpdate::Fan(raw.parse()?),
            AcField::Swing => FieldUpdate::Swing(raw.parse()?),
        })
    }

    pub fn apply_command(
        &mut self,
        field: AcField,
        raw: &str,
    ) -> Result<CommandOutcome, CommandError> {
        let update = self.validate(field, raw)?;
        Ok(self.apply_update(update))
    }

    /// Any change is published. It is transmitted only if the unit is on
    /// before or after the change; edits made while off go out with the next
    /// power-on frame.
    pub fn apply_update(&mut self, update: FieldUpdate) -> CommandOutcome {
        let previous = self.state;
        let mut next = previous;
        update.apply_to(&mut next);

        if next == previous {
            return CommandOutcome::NoChange;
        }
        self.state = next;

        let mut actions = Vec::with_capacity(2);
        if previous.power.is_on() || next.power.is_on() {
            actions.push(SyncAction::Transmit(next));
        }
        actions.push(SyncAction::PublishStatus(next));

        CommandOutcome::StateChanged {
            previous,
            current: next,
            actions,
        }
    }

    pub fn resync_actions(&self, retransmit: bool) -> Vec<SyncAction> {
        let mut actions = Vec::with_capacity(2);
        if retransmit {
            actions.push(SyncAction::Transmit(self.state));
        }
        actions.push(SyncAction::PublishStatus(self.state));
        actions
    }
}
