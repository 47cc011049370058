/// Something that can re-read on-chain state after a confirmed transaction.
pub trait RefreshTrigger: Send + Sync {
    /// Schedules a refresh. Must return immediately.
    fn schedule_refresh(&self);
}
