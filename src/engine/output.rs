use std::sync::{Arc, Mutex};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, Stream, StreamConfig,
};
use tracing::{error, info};

use crate::{
    engine::context::AudioContext,
    error::{Result, SynthError},
    MAX_BLOCK_SIZE,
};

/// Anything that can fill a mono buffer from the audio callback.
pub trait RenderSource: Send {
    fn render(&mut self, out: &mut [f32]);
}

impl RenderSource for AudioContext {
    fn render(&mut self, out: &mut [f32]) {
        AudioContext::render(self, out);
    }
}

/// The default output device, probed and ready to stream.
pub struct OutputDevice {
    device: cpal::Device,
    config: StreamConfig,
    name: String,
}

impl OutputDevice {
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SynthError::DeviceUnavailable("no default output device".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| SynthError::DeviceUnavailable(e.to_string()))?;

        if supported.sample_format() != SampleFormat::F32 {
            return Err(SynthError::DeviceUnavailable(format!(
                "unsupported sample format {:?}",
                supported.sample_format()
            )));
        }

        let name = device.name().unwrap_or_else(|_| "unknown".into());
        let config: StreamConfig = supported.into();
        info!(
            device = %name,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "output device opened"
        );

        Ok(Self {
            device,
            config,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }

    pub fn channels(&self) -> usize {
        self.config.channels as usize
    }

    /// Start streaming `source` to the device. Audio runs until the
    /// returned stream is dropped.
    pub fn start<R: RenderSource + 'static>(&self, source: Arc<Mutex<R>>) -> Result<Stream> {
        let channels = self.channels().max(1);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;

                    // A poisoned lock means the UI thread panicked; play silence
                    let Ok(mut source) = source.lock() else {
                        data.fill(0.0);
                        return;
                    };

                    let mut frames_written = 0;
                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        source.render(block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                            frame.fill(s);
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| SynthError::DeviceUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SynthError::DeviceUnavailable(e.to_string()))?;
        Ok(stream)
    }
}
