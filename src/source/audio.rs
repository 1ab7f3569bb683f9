use super::{draw_gauge, ControlSource};
use crate::control::RawControlReading;
use crate::raster::PreviewImage;
use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::HeapRb;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const BAND_COUNT: usize = 8;
/// Readings older than this count as "no hand".
const STALE_MS: f32 = 500.0;
/// Band energy (0..1) to openness.
const OPENNESS_GAIN: f32 = 0.4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spectrum {
    pub rms: f32,
    pub bands: [f32; BAND_COUNT],
}

impl Spectrum {
    /// Low bands open the left hand, high bands the right.
    pub fn openness(&self) -> (f32, f32) {
        let half = BAND_COUNT / 2;
        let low = self.bands[..half].iter().sum::<f32>() / half as f32;
        let high = self.bands[half..].iter().sum::<f32>() / half as f32;
        ((low * OPENNESS_GAIN).clamp(0.0, 1.0), (high * OPENNESS_GAIN).clamp(0.0, 1.0))
    }
}

/// Seqlock-published spectrum shared between the analyzer thread and the frame loop.
pub struct AtomicSpectrum {
    seq: AtomicU64,
    rms: AtomicU32,
    bands: [AtomicU32; BAND_COUNT],
    updated_ms: AtomicU64,
}

impl AtomicSpectrum {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            rms: AtomicU32::new(0),
            bands: std::array::from_fn(|_| AtomicU32::new(0)),
            updated_ms: AtomicU64::new(0),
        }
    }

    pub fn store(&self, s: Spectrum) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        self.rms.store(s.rms.to_bits(), Ordering::Relaxed);
        for (dst, src) in self.bands.iter().zip(s.bands) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.updated_ms.store(now_ms(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release);
    }

    pub fn load(&self) -> Spectrum {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }
            let rms = f32::from_bits(self.rms.load(Ordering::Relaxed));
            let bands = std::array::from_fn(|i| f32::from_bits(self.bands[i].load(Ordering::Relaxed)));
            if self.seq.load(Ordering::Acquire) == v1 {
                return Spectrum { rms, bands };
            }
        }
    }

    /// Milliseconds since the last store; `None` before the first one.
    pub fn age_ms(&self) -> Option<f32> {
        let t = self.updated_ms.load(Ordering::Relaxed);
        if t == 0 {
            return None;
        }
        Some(now_ms().saturating_sub(t) as f32)
    }
}

impl Default for AtomicSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_millis(0))
        .as_millis() as u64
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

/// Microphone-driven control: an analyzer thread turns band energy into
/// two openness readings.
pub struct AudioSource {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    spectrum: Arc<AtomicSpectrum>,
    preview: PreviewImage,
}

impl AudioSource {
    pub fn new(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device.default_input_config().context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb = HeapRb::<f32>::new((sample_rate_hz as usize).saturating_mul(2));
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let spectrum = Arc::new(AtomicSpectrum::new());
        let spectrum_for_thread = Arc::clone(&spectrum);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| log::error!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };
        stream.play().context("start input stream")?;
        log::info!("audio control: {} Hz, {} channel(s)", sample_rate_hz, channels);

        let analyzer_handle = thread::spawn(move || {
            analyze_loop(&mut cons, sample_rate_hz, &stop_for_thread, &spectrum_for_thread)
        });

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            spectrum,
            preview: PreviewImage::new(32, 20),
        })
    }

    fn redraw(&mut self, s: &Spectrum, live: bool) {
        self.preview.clear();
        for (i, band) in s.bands.iter().enumerate() {
            let level = live.then_some(*band);
            let color = if i < BAND_COUNT / 2 { [0, 220, 90] } else { [230, 40, 40] };
            draw_gauge(&mut self.preview, i * 4, 3, level, color);
        }
    }
}

impl ControlSource for AudioSource {
    fn label(&self) -> &'static str {
        "audio"
    }

    fn read(&mut self, _elapsed: f64) -> RawControlReading {
        let fresh = self.spectrum.age_ms().is_some_and(|age| age <= STALE_MS);
        let s = self.spectrum.load();
        self.redraw(&s, fresh);
        if !fresh {
            return RawControlReading::NONE;
        }
        let (left, right) = s.openness();
        RawControlReading::both(left, right)
    }

    fn preview(&self) -> Option<&PreviewImage> {
        Some(&self.preview)
    }
}

impl Drop for AudioSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
    }
}

fn select_input_device(host: &cpal::Host, device_query: Option<&str>) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    if let Some(want) = device_query.map(str::to_lowercase) {
        return devices
            .into_iter()
            .find(|d| d.name().map(|n| n.to_lowercase().contains(&want)).unwrap_or(false))
            .ok_or_else(|| anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(data: &[T], channels: usize, prod: &mut ringbuf::HeapProd<f32>) {
    for frame in data.chunks(channels.max(1)) {
        let acc = frame.iter().map(|s| s.to_float_sample()).sum::<f32>();
        let _ = prod.try_push(acc / frame.len() as f32);
    }
}

fn analyze_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    sample_rate_hz: u32,
    stop: &AtomicBool,
    spectrum: &AtomicSpectrum,
) {
    let n = 1024usize;
    let hop = 256usize;

    let mut scratch = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    let hann = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
        .collect::<Vec<_>>();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut fft_buf = vec![Complex { re: 0.0, im: 0.0 }; n];
    let mut mags = vec![0.0f32; n / 2];

    let mut smoothed = Spectrum::default();

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            filled = (filled + 1).min(n);
            since_last += 1;
            if filled == n && since_last >= hop {
                since_last = 0;
                let raw = analyze_window(&scratch, write_pos, &hann, &*fft, &mut fft_buf, &mut mags, sample_rate_hz);
                smoothed.rms = smoothed.rms * 0.85 + raw.rms * 0.15;
                for (s, r) in smoothed.bands.iter_mut().zip(raw.bands) {
                    *s = *s * 0.85 + r * 0.15;
                }
                spectrum.store(smoothed);
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

fn analyze_window(
    scratch: &[f32],
    write_pos: usize,
    hann: &[f32],
    fft: &dyn rustfft::Fft<f32>,
    fft_buf: &mut [Complex<f32>],
    mags: &mut [f32],
    sample_rate_hz: u32,
) -> Spectrum {
    let n = fft_buf.len();
    let half = mags.len();

    let mut rms_acc = 0.0f32;
    for i in 0..n {
        let s = scratch[(write_pos + i) % n];
        rms_acc += s * s;
        fft_buf[i] = Complex { re: s * hann[i], im: 0.0 };
    }
    let rms = (rms_acc / n as f32).sqrt().clamp(0.0, 1.0);

    fft.process(fft_buf);
    for (m, c) in mags.iter_mut().zip(fft_buf.iter()) {
        *m = c.norm();
    }

    let edges_hz = [20.0, 60.0, 150.0, 400.0, 1000.0, 2500.0, 6000.0, 12000.0, 20000.0];
    let mut bands = [0.0f32; BAND_COUNT];
    let mut counts = [0u32; BAND_COUNT];
    let sr = sample_rate_hz as f32;
    for (i, m) in mags.iter().enumerate().take(half).skip(1) {
        let f = (i as f32) * sr / (n as f32);
        if f < edges_hz[0] {
            continue;
        }
        if f >= edges_hz[BAND_COUNT] {
            break;
        }
        let band = edges_hz[1..BAND_COUNT].iter().take_while(|&&e| f >= e).count();
        bands[band] += m;
        counts[band] += 1;
    }
    for (b, c) in bands.iter_mut().zip(counts) {
        *b = (*b / c.max(1) as f32 * 0.01).tanh();
    }

    Spectrum { rms, bands }
}
