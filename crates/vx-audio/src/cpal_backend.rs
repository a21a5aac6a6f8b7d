//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use vx_engine::{BufferAllocator, Renderer, Retired, SessionUpdate};
use vx_ir::{BufferShape, PhonemeBuffer};

use crate::traits::{AudioDevice, DeviceClock, InitializationError};

/// Capacity of the update and retire rings.
pub const HANDOFF_CAPACITY: usize = 64;

/// Control-side ends of the renderer handoff.
pub struct Handoff {
    /// Whole-value updates for the render thread
    pub updates: HeapProd<SessionUpdate>,
    /// Values displaced by applied updates, dropped on the control side
    pub retired: HeapCons<Retired>,
}

/// CPAL-based audio output.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    clock: DeviceClock,
}

impl CpalOutput {
    /// Open the default output device in its default configuration.
    pub fn new() -> Result<Self, InitializationError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(InitializationError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| InitializationError::DeviceConfig(e.to_string()))?;
        let config: StreamConfig = config.into();

        tracing::info!(
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "opened audio output device"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            clock: DeviceClock::new(),
        })
    }

    /// Build and start the output stream, moving `renderer` into the callback.
    ///
    /// Each callback first applies pending updates, then renders the whole
    /// buffer against the device clock.
    pub fn build_stream(&mut self, mut renderer: Renderer) -> Result<Handoff, InitializationError> {
        let (updates, mut update_rx) = HeapRb::<SessionUpdate>::new(HANDOFF_CAPACITY).split();
        let (mut retire_tx, retired) = HeapRb::<Retired>::new(HANDOFF_CAPACITY).split();
        let clock = self.clock;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    while let Some(update) = update_rx.try_pop() {
                        if let Some(old) = renderer.apply(update) {
                            // Dropped here only if the control side stopped collecting
                            let _ = retire_tx.try_push(old);
                        }
                    }
                    renderer.render(clock.now(), data);
                },
                |err| tracing::error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| InitializationError::StreamCreate(e.to_string()))?;

        stream
            .play()
            .map_err(|e| InitializationError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(Handoff { updates, retired })
    }
}

impl BufferAllocator for CpalOutput {
    fn allocate(&self, shape: BufferShape) -> PhonemeBuffer {
        PhonemeBuffer::new(shape)
    }
}

impl AudioDevice for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn channels(&self) -> u16 {
        self.config.channels
    }

    fn current_time(&self) -> f64 {
        self.clock.now()
    }
}
