//! Audio device output through cpal.

use super::mixer::VoiceMixer;
use super::output::AudioOutput;
use super::synth::Clip;
use crate::error::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default output device fed from a mixer shared with the stream callback.
///
/// The stream is created lazily by [`open`](AudioOutput::open) so that no
/// device is touched before the user has interacted with the app.
pub struct CpalOutput {
    mixer: Arc<Mutex<VoiceMixer>>,
    stream: Option<cpal::Stream>,
    device_name: Option<String>,
    sample_rate: u32,
}

impl CpalOutput {
    pub fn new(max_voices: usize) -> Self {
        Self {
            mixer: Arc::new(Mutex::new(VoiceMixer::new(max_voices, 0.0))),
            stream: None,
            device_name: None,
            sample_rate: 0,
        }
    }

    /// Name of the opened device.
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }
}

fn lock(mixer: &Mutex<VoiceMixer>) -> MutexGuard<'_, VoiceMixer> {
    match mixer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl AudioOutput for CpalOutput {
    fn open(&mut self) -> Result<u32, AudioError> {
        if self.stream.is_some() {
            return Ok(self.sample_rate);
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Unavailable("no default output device".to_owned()))?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown output device".to_owned());

        let supported = device
            .default_output_config()
            .map_err(|err| AudioError::Unavailable(err.to_string()))?;
        let config = supported.config();

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, self.mixer.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, self.mixer.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, self.mixer.clone())?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream
            .play()
            .map_err(|err| AudioError::StreamPlay(err.to_string()))?;

        log::info!(
            "audio output on {} at {} Hz",
            device_name,
            config.sample_rate.0
        );
        self.sample_rate = config.sample_rate.0;
        self.device_name = Some(device_name);
        self.stream = Some(stream);
        Ok(self.sample_rate)
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        match &self.stream {
            Some(stream) => stream
                .play()
                .map_err(|err| AudioError::StreamPlay(err.to_string())),
            None => Err(AudioError::Unavailable("stream not opened".to_owned())),
        }
    }

    fn play(&mut self, clip: &Clip) -> bool {
        self.stream.is_some() && lock(&self.mixer).add(clip)
    }

    fn set_gain(&mut self, gain: f32) {
        lock(&self.mixer).set_gain(gain);
    }

    fn active_voices(&self) -> usize {
        lock(&self.mixer).active()
    }

    fn advance(&mut self, _dt: f32) {}
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mixer: Arc<Mutex<VoiceMixer>>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut mono: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _| {
                let frames = data.len() / channels.max(1);
                mono.resize(frames, 0.0);
                lock(&mixer).render(&mut mono);
                for (frame, sample) in data.chunks_mut(channels.max(1)).zip(&mono) {
                    for out in frame.iter_mut() {
                        *out = T::from_sample(*sample);
                    }
                }
            },
            move |err| {
                log::warn!("audio stream error: {err}");
            },
            None,
        )
        .map_err(|err| AudioError::StreamBuild(err.to_string()))
}
