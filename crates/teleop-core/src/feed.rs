/// External video receiver whose lifetime is bound to the flight session.
#[allow(async_fn_in_trait)]
pub trait VideoFeed {
    async fn start(&mut self) -> anyhow::Result<()>;
    /// Terminate and reap. Must be a no-op when nothing is running.
    async fn stop(&mut self) -> anyhow::Result<()>;
}

/// Used when the video feed is disabled.
#[derive(Debug, Default)]
pub struct NoVideo;

impl VideoFeed for NoVideo {
    async fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
