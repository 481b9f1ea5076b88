/// Output signalling that a write is in progress, such as a mass storage LED or a status colour.
pub trait ActivityIndicator {
    /// Configure the output. Called once while the disk is brought up.
    fn configure(&mut self) {}

    fn set_active(&mut self, active: bool);
}

/// For boards with nothing to light up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl ActivityIndicator for NoIndicator {
    fn set_active(&mut self, _active: bool) {}
}

/// Holds the indicator active until dropped.
pub(crate) struct ActiveWrite<'a, L: ActivityIndicator> {
    indicator: &'a mut L,
}

impl<'a, L: ActivityIndicator> ActiveWrite<'a, L> {
    pub(crate) fn start(indicator: &'a mut L) -> Self {
        indicator.set_active(true);
        ActiveWrite { indicator }
    }
}

impl<'a, L: ActivityIndicator> Drop for ActiveWrite<'a, L> {
    fn drop(&mut self) {
        self.indicator.set_active(false);
    }
}
