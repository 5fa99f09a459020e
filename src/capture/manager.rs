//! 相机资源管理器：幂等获取、安全释放、单次快照。

use image::DynamicImage;

use super::{CameraBackend, CameraError, LiveFeed};

/// 相机资源管理器。
///
/// 同一时刻最多持有一个实时画面。
pub struct CameraManager<B: CameraBackend> {
    backend: B,
    feed: Option<B::Feed>,
}

impl<B: CameraBackend> CameraManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, feed: None }
    }

    /// 是否持有设备。
    pub fn is_acquired(&self) -> bool {
        self.feed.is_some()
    }

    /// 获取设备；已持有时为空操作。
    pub async fn acquire(&mut self) -> Result<(), CameraError> {
        if self.feed.is_some() {
            log::debug!("📷 相机已处于打开状态，跳过重复获取");
            return Ok(());
        }

        log::info!("📷 请求相机设备...");
        let feed = self.backend.open().await?;
        self.feed = Some(feed);
        log::info!("✅ 相机已打开");
        Ok(())
    }

    /// 停止并丢弃设备；未持有时为空操作。
    pub fn release(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
            log::info!("🛑 相机已释放");
        }
    }

    /// 抓取当前画面并立即释放设备。
    ///
    /// 未持有设备时返回 `CameraError::NotActive`；抓帧失败同样会释放设备。
    pub async fn snapshot(&mut self) -> Result<DynamicImage, CameraError> {
        let Some(feed) = self.feed.as_mut() else {
            return Err(CameraError::NotActive);
        };

        let frame = feed.capture_frame().await;
        self.release();
        frame
    }
}

impl<B: CameraBackend> Drop for CameraManager<B> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        opened: Cell<u32>,
        stopped: Cell<u32>,
    }

    struct FakeBackend {
        counters: Rc<Counters>,
        deny: bool,
        fail_capture: bool,
    }

    struct FakeFeed {
        counters: Rc<Counters>,
        fail_capture: bool,
    }

    impl CameraBackend for FakeBackend {
        type Feed = FakeFeed;

        async fn open(&self) -> Result<FakeFeed, CameraError> {
            if self.deny {
                return Err(CameraError::Denied("permission refused".into()));
            }
            self.counters.opened.set(self.counters.opened.get() + 1);
            Ok(FakeFeed {
                counters: Rc::clone(&self.counters),
                fail_capture: self.fail_capture,
            })
        }
    }

    impl LiveFeed for FakeFeed {
        async fn capture_frame(&mut self) -> Result<DynamicImage, CameraError> {
            if self.fail_capture {
                return Err(CameraError::Capture("sensor timeout".into()));
            }
            Ok(DynamicImage::new_rgb8(4, 4))
        }

        fn stop(&mut self) {
            self.counters.stopped.set(self.counters.stopped.get() + 1);
        }
    }

    fn manager(deny: bool, fail_capture: bool) -> (CameraManager<FakeBackend>, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        let backend = FakeBackend {
            counters: Rc::clone(&counters),
            deny,
            fail_capture,
        };
        (CameraManager::new(backend), counters)
    }

    #[tokio::test]
    async fn acquire_is_idempotent() {
        let (mut camera, counters) = manager(false, false);

        camera.acquire().await.expect("first acquire");
        camera.acquire().await.expect("second acquire");

        assert!(camera.is_acquired());
        assert_eq!(counters.opened.get(), 1);
    }

    #[tokio::test]
    async fn denied_acquire_leaves_no_handle() {
        let (mut camera, _) = manager(true, false);

        assert!(matches!(camera.acquire().await, Err(CameraError::Denied(_))));
        assert!(!camera.is_acquired());
    }

    #[test]
    fn release_without_handle_is_noop() {
        let (mut camera, counters) = manager(false, false);

        camera.release();
        camera.release();

        assert_eq!(counters.stopped.get(), 0);
    }

    #[tokio::test]
    async fn snapshot_releases_device() {
        let (mut camera, counters) = manager(false, false);
        camera.acquire().await.expect("acquire");

        let frame = camera.snapshot().await.expect("snapshot");

        assert_eq!(frame.width(), 4);
        assert!(!camera.is_acquired());
        assert_eq!(counters.stopped.get(), 1);
    }

    #[tokio::test]
    async fn failed_capture_still_releases_device() {
        let (mut camera, counters) = manager(false, true);
        camera.acquire().await.expect("acquire");

        assert!(matches!(camera.snapshot().await, Err(CameraError::Capture(_))));
        assert!(!camera.is_acquired());
        assert_eq!(counters.stopped.get(), 1);
    }

    #[tokio::test]
    async fn snapshot_without_handle_is_not_active() {
        let (mut camera, _) = manager(false, false);

        assert!(matches!(camera.snapshot().await, Err(CameraError::NotActive)));
    }

    #[tokio::test]
    async fn drop_releases_held_device() {
        let (mut camera, counters) = manager(false, false);
        camera.acquire().await.expect("acquire");

        drop(camera);

        assert_eq!(counters.stopped.get(), 1);
    }
}
