use lxx_frame_common::*;

use super::{DisplayService, RenderOutcome};
use crate::driver::PanelDriver;

/// 本次唤醒后面板上显示的内容
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleContent {
    Image(RenderOutcome),
    /// 网络不可用，面板已清屏
    ClearedOffline(NetworkError),
    /// 出错，面板保持上一次的内容
    Failed(FrameError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub content: CycleContent,
    pub panel_asleep: bool,
}

/// 一次完整的唤醒周期：显示图像后休眠，到时由深度睡眠唤醒重新开始
pub struct RefreshCycle<D, N, F, P>
where
    D: PanelDriver,
    N: NetworkLink,
    F: ImageFetcher,
    P: PowerControl,
{
    display: DisplayService<D>,
    network: N,
    fetcher: F,
    power: P,
    credentials: DeviceCredentials,
    config: CycleConfig,
}

impl<D, N, F, P> RefreshCycle<D, N, F, P>
where
    D: PanelDriver,
    N: NetworkLink,
    F: ImageFetcher,
    P: PowerControl,
{
    pub fn new(driver: D, network: N, fetcher: F, power: P, config: &FrameConfig) -> Self {
        Self {
            display: DisplayService::new(driver, config.render, config.cycle.clear_color),
            network,
            fetcher,
            power,
            credentials: config.credentials.clone(),
            config: config.cycle,
        }
    }

    pub fn display(&self) -> &DisplayService<D> {
        &self.display
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    /// 执行一个周期，出错时仍然让面板和主控进入睡眠
    pub fn run_once(&mut self) -> CycleReport {
        info!("Starting refresh cycle");

        let content = match self.update_panel() {
            Ok(content) => content,
            Err(e) => {
                error!("Refresh cycle failed: {}", e);
                CycleContent::Failed(e)
            }
        };

        let panel_asleep = match self.display.sleep() {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to put EPD to sleep: {}", e);
                false
            }
        };

        debug!("Waiting {} ms before sleep", self.config.settle_before_sleep_ms);
        self.power.light_sleep(self.config.settle_before_sleep_ms);

        if self.network.is_connected() {
            self.network.disconnect();
        }

        info!("Entering deep sleep for {} ms", self.config.wake_interval_ms);
        self.power.deep_sleep(self.config.wake_interval_ms);

        CycleReport {
            content,
            panel_asleep,
        }
    }

    fn update_panel(&mut self) -> FrameResult<CycleContent> {
        self.display.bring_up()?;

        info!("Connecting to WiFi {}", self.credentials.wifi_ssid.as_str());
        if let Err(e) = self
            .network
            .connect(&self.credentials, self.config.connect_timeout_s)
        {
            warn!("WiFi connection failed: {}", e);
            self.power.light_sleep(self.config.settle_before_sleep_ms);
            self.display.clear()?;
            return Ok(CycleContent::ClearedOffline(e));
        }

        info!("Downloading BMP from {}", self.credentials.url.as_str());
        let response = self.fetcher.fetch(&self.credentials.url)?;
        let outcome = self.display.show_response(response)?;
        Ok(CycleContent::Image(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::testing::BmpBuilder;
    use crate::services::display_service::testing::{FakePanel, PanelOp};
    use alloc::vec;
    use alloc::vec::Vec;

    struct FakeLink {
        available: bool,
        connected: bool,
        disconnects: u32,
    }

    impl NetworkLink for FakeLink {
        fn connect(&mut self, _credentials: &DeviceCredentials, timeout_s: u8) -> Result<(), NetworkError> {
            assert_eq!(timeout_s, 10);
            if !self.available {
                return Err(NetworkError::Timeout);
            }
            self.connected = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn disconnect(&mut self) {
            self.connected = false;
            self.disconnects += 1;
        }
    }

    struct Body {
        data: Vec<u8>,
        pos: usize,
    }

    impl ByteSource for Body {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct FakeFetcher {
        status: u16,
        body: Vec<u8>,
        requested: Vec<alloc::string::String>,
    }

    impl ImageFetcher for FakeFetcher {
        type Body = Body;

        fn fetch(&mut self, url: &str) -> Result<ImageResponse<Self::Body>, FetchError> {
            self.requested.push(url.into());
            let body = Body {
                data: self.body.clone(),
                pos: 0,
            };
            Ok(ImageResponse::new(self.status, body))
        }
    }

    #[derive(Default)]
    struct SleepLog {
        light: Vec<u32>,
        deep: Vec<u32>,
    }

    impl PowerControl for SleepLog {
        fn light_sleep(&mut self, duration_ms: u32) {
            self.light.push(duration_ms);
        }

        fn deep_sleep(&mut self, duration_ms: u32) {
            self.deep.push(duration_ms);
        }
    }

    fn config() -> FrameConfig {
        FrameConfig::from_json(
            br#"{ "credentials": { "wifi_ssid": "ap", "wifi_password": "pw", "url": "http://frame.local/a.bmp" } }"#,
        )
        .unwrap()
    }

    fn cycle(available: bool, status: u16, body: Vec<u8>) -> RefreshCycle<FakePanel, FakeLink, FakeFetcher, SleepLog> {
        RefreshCycle::new(
            FakePanel::new(),
            FakeLink {
                available,
                connected: false,
                disconnects: 0,
            },
            FakeFetcher {
                status,
                body,
                requested: Vec::new(),
            },
            SleepLog::default(),
            &config(),
        )
    }

    #[test]
    fn online_cycle_shows_image_then_sleeps() {
        let bmp = BmpBuilder::new(168, 400).build(|_, _| Rgb::new(255, 255, 255));
        let mut cycle = cycle(true, 200, bmp);

        let report = cycle.run_once();
        assert_eq!(
            report,
            CycleReport {
                content: CycleContent::Image(RenderOutcome::Displayed),
                panel_asleep: true
            }
        );
        assert_eq!(cycle.fetcher.requested, vec!["http://frame.local/a.bmp"]);
        assert_eq!(
            cycle.display().driver().ops,
            vec![
                PanelOp::Reset,
                PanelOp::Initialize,
                PanelOp::Write(vec![0x55; 16_800]),
                PanelOp::Refresh,
                PanelOp::Sleep
            ]
        );
        assert_eq!(cycle.power().light, vec![10_000]);
        assert_eq!(cycle.power().deep, vec![300_000]);
        assert!(!cycle.network().is_connected());
        assert_eq!(cycle.network().disconnects, 1);
    }

    #[test]
    fn offline_cycle_clears_panel() {
        let mut cycle = cycle(false, 200, Vec::new());

        let report = cycle.run_once();
        assert_eq!(report.content, CycleContent::ClearedOffline(NetworkError::Timeout));
        assert!(report.panel_asleep);
        assert!(cycle.fetcher.requested.is_empty());
        assert_eq!(
            cycle.display().driver().ops[2..],
            [PanelOp::Clear(0x55), PanelOp::Refresh, PanelOp::Sleep]
        );
        assert_eq!(cycle.power().light, vec![10_000, 10_000]);
        assert_eq!(cycle.network().disconnects, 0);
    }

    #[test]
    fn http_error_still_sleeps() {
        let mut cycle = cycle(true, 500, Vec::new());

        let report = cycle.run_once();
        assert_eq!(report.content, CycleContent::Failed(FrameError::HttpStatus(500)));
        assert!(report.panel_asleep);
        assert_eq!(cycle.display().driver().ops.last(), Some(&PanelOp::Sleep));
        assert_eq!(cycle.power().deep, vec![300_000]);
    }
}
