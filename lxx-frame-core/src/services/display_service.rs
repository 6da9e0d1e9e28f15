use lxx_frame_common::*;

use crate::driver::PanelDriver;
use crate::render::decode_bitmap;

/// 一次显示请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOutcome {
    /// 图像已刷新到面板
    Displayed,
    /// 图像格式不支持，面板改为清屏
    FallbackCleared(FrameError),
    /// 数据流不完整，丢弃本次结果，面板内容保持不变
    Discarded(FrameError),
}

pub struct DisplayService<D: PanelDriver> {
    driver: D,
    render: RenderConfig,
    clear_color: u8,
}

impl<D: PanelDriver> DisplayService<D> {
    /// 解码始终以面板自身尺寸为准，配置中的尺寸不一致时改用面板尺寸
    pub fn new(driver: D, mut render: RenderConfig, clear_color: u8) -> Self {
        let panel = driver.geometry();
        if render.geometry != panel {
            warn!(
                "Configured geometry {}x{} differs from panel {}x{}, using panel geometry",
                render.geometry.width, render.geometry.height, panel.width, panel.height
            );
            render.geometry = panel;
        }
        Self {
            driver,
            render,
            clear_color,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    pub fn bring_up(&mut self) -> FrameResult<()> {
        info!("Initializing display service");
        self.run(D::init)
    }

    /// 检查 HTTP 状态后解码响应体并显示
    pub fn show_response<S: ByteSource>(&mut self, mut response: ImageResponse<S>) -> FrameResult<RenderOutcome> {
        if !response.is_success() {
            error!("Error downloading BMP: status code {}", response.status);
            return Err(FrameError::HttpStatus(response.status));
        }
        self.show_bitmap(&mut response.body)
    }

    pub fn show_bitmap<S>(&mut self, source: &mut S) -> FrameResult<RenderOutcome>
    where
        S: ByteSource + ?Sized,
    {
        self.ensure_ready()?;

        match decode_bitmap(source, &self.render) {
            Ok(framebuffer) => {
                info!("Displaying image on EPD");
                self.run(|driver| driver.display(framebuffer))?;
                Ok(RenderOutcome::Displayed)
            }
            Err(e @ FrameError::Format(_)) => {
                warn!("Unsupported image ({}), clearing panel instead", e);
                self.clear()?;
                Ok(RenderOutcome::FallbackCleared(e))
            }
            Err(e @ (FrameError::TruncatedStream { .. } | FrameError::Source(_))) => {
                warn!("Image display skipped due to processing errors: {}", e);
                Ok(RenderOutcome::Discarded(e))
            }
            Err(e) => {
                error!("Failed to render image: {}", e);
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) -> FrameResult<()> {
        self.ensure_ready()?;
        let color = self.clear_color;
        self.run(|driver| driver.clear(color))
    }

    /// 让面板进入深度睡眠，面板未就绪时先恢复
    pub fn sleep(&mut self) -> FrameResult<()> {
        self.ensure_ready()?;
        info!("Putting EPD to sleep");
        self.run(D::sleep)
    }

    fn ensure_ready(&mut self) -> FrameResult<()> {
        if self.driver.state() == DeviceState::Ready {
            return Ok(());
        }
        self.run(D::recover)
    }

    /// 执行驱动操作，忙等待超时后立即复位面板再返回错误
    fn run(&mut self, op: impl FnOnce(&mut D) -> DisplayResult<()>) -> FrameResult<()> {
        let result = op(&mut self.driver);
        if let Err(DisplayError::Timeout { waited_ms }) = result {
            warn!("EPD timed out after {} ms, resetting panel", waited_ms);
            if let Err(e) = self.driver.recover() {
                error!("EPD recovery failed: {}", e);
            }
        }
        result.map_err(FrameError::from)
    }
}
