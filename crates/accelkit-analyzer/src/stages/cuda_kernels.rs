//! CUDA C source of the stage kernels, compiled at run time with NVRTC.
//!
//! Every kernel walks `elems` consecutive items per thread, starting at
//! `global_thread * elems`, which is the element layout of a work division.
//! Arithmetic mirrors the host kernels operation by operation; the source is
//! compiled without FMA contraction so per-item results are bit-identical.

/// Module name the kernels are loaded under.
pub(crate) const MODULE: &str = "accelkit_analyzer";

/// Kernel entry points.
pub(crate) const FUNCTIONS: [&str; 5] = [
    "calibrate",
    "mark_seeds",
    "compact_seeds",
    "accumulate",
    "partial_charge",
];

pub(crate) const SOURCE: &str = r#"
__device__ __forceinline__ unsigned long long global_thread()
{
    return (unsigned long long)blockIdx.x * blockDim.x + threadIdx.x;
}

extern "C" __global__ void calibrate(
    const unsigned short* adc,
    const unsigned int* module,
    const float* gains,
    float pedestal,
    unsigned int n,
    unsigned int elems,
    float* charge)
{
    unsigned long long begin = global_thread() * elems;
    for (unsigned long long i = begin; i < begin + elems && i < n; ++i) {
        float q = ((float)adc[i] - pedestal) * gains[module[i]];
        charge[i] = q > 0.0f ? q : 0.0f;
    }
}

extern "C" __global__ void mark_seeds(
    const unsigned int* module,
    const unsigned int* channel,
    unsigned int n,
    unsigned int elems,
    unsigned int* seed)
{
    unsigned long long begin = global_thread() * elems;
    for (unsigned long long i = begin; i < begin + elems && i < n; ++i) {
        seed[i] = (i == 0
                   || module[i] != module[i - 1]
                   || channel[i] - channel[i - 1] > 1u) ? 1u : 0u;
    }
}

extern "C" __global__ void compact_seeds(
    const unsigned int* seed,
    unsigned int n,
    unsigned int* starts,
    unsigned int* count)
{
    if (global_thread() != 0) {
        return;
    }
    unsigned int k = 0;
    for (unsigned int i = 0; i < n; ++i) {
        if (seed[i]) {
            starts[k++] = i;
        }
    }
    *count = k;
}

extern "C" __global__ void accumulate(
    const unsigned int* starts,
    unsigned int clusters,
    unsigned int n,
    const unsigned int* module,
    const unsigned int* channel,
    const float* charge,
    unsigned int elems,
    unsigned int* meta,
    float* values)
{
    unsigned long long begin = global_thread() * elems;
    for (unsigned long long c = begin; c < begin + elems && c < clusters; ++c) {
        unsigned int lo = starts[c];
        unsigned int hi = c + 1 < clusters ? starts[c + 1] : n;
        float q = 0.0f;
        float qx = 0.0f;
        for (unsigned int i = lo; i < hi; ++i) {
            float qi = charge[i];
            q = q + qi;
            qx = qx + qi * (float)channel[i];
        }
        unsigned int size = hi - lo;
        unsigned int first = channel[lo];
        meta[3 * c] = module[lo];
        meta[3 * c + 1] = first;
        meta[3 * c + 2] = size;
        values[2 * c] = q;
        values[2 * c + 1] = q > 0.0f ? qx / q : (float)first + (float)(size - 1) * 0.5f;
    }
}

extern "C" __global__ void partial_charge(
    const float* values,
    unsigned int clusters,
    unsigned int elems,
    unsigned int threads,
    double* partials)
{
    unsigned long long t = global_thread();
    if (t >= threads) {
        return;
    }
    double p = 0.0;
    unsigned long long begin = t * elems;
    for (unsigned long long c = begin; c < begin + elems && c < clusters; ++c) {
        p += (double)values[2 * c];
    }
    partials[t] = p;
}
"#;
