// Dense f32 kernels used by cosine similarity and k-means.
// AVX2/FMA when the CPU has it, otherwise an unrolled scalar loop that the
// compiler can vectorize on its own.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "x86_64")]
const MIN_DIM_SIZE_AVX: usize = 32;

/// Dot product of two equally sized slices. Mismatched lengths yield 0.0.
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_AVX
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// Euclidean norm
#[inline]
pub fn norm_simd(a: &[f32]) -> f32 {
    dot_product_simd(a, a).sqrt()
}

/// Squared euclidean distance, used for nearest-centroid assignment
#[inline]
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    let mut acc = [0.0f32; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();

    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..4 {
            let d = ca[lane] - cb[lane];
            acc[lane] += d * d;
        }
    }

    acc.iter().sum::<f32>() + tail
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc_lo = _mm256_setzero_ps();
    let mut acc_hi = _mm256_setzero_ps();

    while i + 16 <= dim {
        let a_lo = _mm256_loadu_ps(a.as_ptr().add(i));
        let b_lo = _mm256_loadu_ps(b.as_ptr().add(i));
        let a_hi = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let b_hi = _mm256_loadu_ps(b.as_ptr().add(i + 8));
        acc_lo = _mm256_fmadd_ps(a_lo, b_lo, acc_lo);
        acc_hi = _mm256_fmadd_ps(a_hi, b_hi, acc_hi);
        i += 16;
    }

    let mut lanes = [0.0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), _mm256_add_ps(acc_lo, acc_hi));
    let mut dot: f32 = lanes.iter().sum();

    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = [0.0f32; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum();

    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..4 {
            acc[lane] += ca[lane] * cb[lane];
        }
    }

    acc.iter().sum::<f32>() + tail
}
