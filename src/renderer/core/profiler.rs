//! GPU Pass Timing
//!
//! Six begin/end timestamp pairs, one per pass group. Each group writes its
//! begin stamp at the start of its first render pass and its end stamp at the
//! close of its last, so the delta covers everything between.
//!
//! Readback is synchronous: after the frame is submitted, [`GpuProfiler::read`]
//! maps the resolve buffer and waits for the GPU. Without `TIMESTAMP_QUERY`
//! the profiler is inert and every timing is `None`.

use crate::errors::Result;
use crate::renderer::core::readback::map_buffer_blocking;

/// A timed group of passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassTiming {
    Geometry,
    AmbientOcclusion,
    Lighting,
    PostProcess,
    Forward,
    Ui,
}

impl PassTiming {
    pub const COUNT: usize = 6;

    #[must_use]
    pub fn all() -> &'static [PassTiming; Self::COUNT] {
        &[
            Self::Geometry,
            Self::AmbientOcclusion,
            Self::Lighting,
            Self::PostProcess,
            Self::Forward,
            Self::Ui,
        ]
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "Geometry",
            Self::AmbientOcclusion => "SAO",
            Self::Lighting => "Lighting",
            Self::PostProcess => "Post-process",
            Self::Forward => "Forward",
            Self::Ui => "UI",
        }
    }

    fn begin_query(self) -> u32 {
        self as u32 * 2
    }

    fn end_query(self) -> u32 {
        self as u32 * 2 + 1
    }
}

/// Which end of a pass group a render pass sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    Begin,
    End,
    Both,
    None,
}

/// Milliseconds spent in each pass group, `None` when unmeasured.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimings {
    pub passes: [Option<f32>; PassTiming::COUNT],
}

impl FrameTimings {
    #[must_use]
    pub fn get(&self, pass: PassTiming) -> Option<f32> {
        self.passes[pass.index()]
    }

    /// Sum of the measured groups.
    #[must_use]
    pub fn total_ms(&self) -> Option<f32> {
        if self.passes.iter().all(Option::is_none) {
            return None;
        }
        Some(self.passes.iter().flatten().sum())
    }

    /// Converts raw begin/end tick pairs into milliseconds.
    ///
    /// `period_ns` is nanoseconds per tick. Pairs where the end precedes the
    /// begin (a counter reset or an unwritten query) report `None`.
    #[must_use]
    pub fn from_ticks(ticks: &[u64], period_ns: f32) -> Self {
        let mut passes = [None; PassTiming::COUNT];
        for (slot, pair) in passes.iter_mut().zip(ticks.chunks_exact(2)) {
            if let [begin, end] = *pair
                && end >= begin
                && begin != 0
            {
                *slot = Some((end - begin) as f32 * period_ns / 1_000_000.0);
            }
        }
        Self { passes }
    }
}

struct QueryResources {
    query_set: wgpu::QuerySet,
    resolve: wgpu::Buffer,
    readback: wgpu::Buffer,
    period_ns: f32,
}

/// Owner of the timestamp query set and its readback buffers.
pub struct GpuProfiler {
    resources: Option<QueryResources>,
}

const QUERY_COUNT: u32 = PassTiming::COUNT as u32 * 2;
const QUERY_BYTES: u64 = QUERY_COUNT as u64 * 8;

impl GpuProfiler {
    /// A profiler; inert when `enabled` is `false`.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, enabled: bool) -> Self {
        if !enabled {
            return Self { resources: None };
        }

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("Pass Timestamps"),
            ty: wgpu::QueryType::Timestamp,
            count: QUERY_COUNT,
        });
        let resolve = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Timestamp Resolve"),
            size: QUERY_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Timestamp Readback"),
            size: QUERY_BYTES,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            resources: Some(QueryResources {
                query_set,
                resolve,
                readback,
                period_ns: queue.get_timestamp_period(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.resources.is_some()
    }

    /// Timestamp writes for a render pass at `stamp` of the `pass` group.
    #[must_use]
    pub fn pass_writes(
        &self,
        pass: PassTiming,
        stamp: Stamp,
    ) -> Option<wgpu::RenderPassTimestampWrites<'_>> {
        let res = self.resources.as_ref()?;
        let (begin, end) = match stamp {
            Stamp::Begin => (Some(pass.begin_query()), None),
            Stamp::End => (None, Some(pass.end_query())),
            Stamp::Both => (Some(pass.begin_query()), Some(pass.end_query())),
            Stamp::None => return None,
        };
        Some(wgpu::RenderPassTimestampWrites {
            query_set: &res.query_set,
            beginning_of_pass_write_index: begin,
            end_of_pass_write_index: end,
        })
    }

    /// Records the resolve and the copy into the mappable buffer.
    pub fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some(res) = &self.resources else {
            return;
        };
        encoder.resolve_query_set(&res.query_set, 0..QUERY_COUNT, &res.resolve, 0);
        encoder.copy_buffer_to_buffer(&res.resolve, 0, &res.readback, 0, QUERY_BYTES);
    }

    /// Waits for the submitted frame and converts the stamps to milliseconds.
    pub fn read(&self, device: &wgpu::Device) -> Result<FrameTimings> {
        let Some(res) = &self.resources else {
            return Ok(FrameTimings::default());
        };
        let bytes = map_buffer_blocking(device, &res.readback)?;
        // The mapped bytes carry no u64 alignment guarantee.
        let ticks: Vec<u64> = bytemuck::pod_collect_to_vec(&bytes);
        Ok(FrameTimings::from_ticks(&ticks, res.period_ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_convert_with_period() {
        let mut ticks = [0u64; 12];
        ticks[0] = 1_000;
        ticks[1] = 3_000_000;
        let t = FrameTimings::from_ticks(&ticks, 1.0);
        let geometry = t.get(PassTiming::Geometry).unwrap_or_default();
        assert!((geometry - 2.999).abs() < 1e-3);
        assert_eq!(t.get(PassTiming::Ui), None);
    }

    #[test]
    fn query_indices_pair_up() {
        for pass in PassTiming::all() {
            assert_eq!(pass.end_query(), pass.begin_query() + 1);
        }
        assert_eq!(PassTiming::Ui.end_query(), QUERY_COUNT - 1);
    }
}
