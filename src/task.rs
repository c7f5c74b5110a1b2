//! Chunk-parallel map/reduce over aligned vectors.
//!
//! A [`MapReduce`] task sees one chunk index at a time: the chunks of every
//! input vector at that index, bound and row-aligned. Partial results are then
//! folded together with [`MapReduce::reduce`]. [`run_local`] is the in-process
//! driver; it visits chunks sequentially on the calling thread.

use std::sync::Arc;

use tracing::debug;

use crate::chunk::Chunk;
use crate::error::FvecError;
use crate::store::KeyValueStore;
use crate::vector::Vector;

/// A task mapped over chunk indices and reduced into one result.
pub trait MapReduce: Sized {
    /// Process the aligned chunks of one chunk index, one per input vector.
    fn map(&mut self, chunks: &[Arc<Chunk>]);

    /// Fold another partial result into this one.
    fn reduce(&mut self, other: Self);
}

fn same_layout(a: &Vector, b: &Vector) -> bool {
    a.n_chunks() == b.n_chunks()
        && (0..=a.n_chunks()).all(|c| a.chunk2start_elem(c) == b.chunk2start_elem(c))
}

/// Run a task over every chunk index of `vectors`.
///
/// `factory` builds a fresh task per chunk index. Partial results are reduced
/// in chunk order. With no chunks the result is a single unmapped task.
pub fn run_local<T, F, S>(factory: F, store: &S, vectors: &[&Vector]) -> Result<T, FvecError>
where
    T: MapReduce,
    F: Fn() -> T,
    S: KeyValueStore + ?Sized,
{
    let first = vectors
        .first()
        .ok_or_else(|| FvecError::InvalidLayout("no input vectors".to_string()))?;
    if let Some(other) = vectors.iter().find(|v| !same_layout(first, v)) {
        return Err(FvecError::InvalidLayout(format!(
            "{} and {} are not chunk-aligned",
            first.key(),
            other.key()
        )));
    }

    debug!(vectors = vectors.len(), chunks = first.n_chunks(), "running task");
    let mut acc: Option<T> = None;
    for cidx in 0..first.n_chunks() {
        let chunks = vectors
            .iter()
            .map(|v| v.elem2bv(store, cidx))
            .collect::<Result<Vec<_>, _>>()?;
        let mut task = factory();
        task.map(&chunks);
        match acc.as_mut() {
            Some(acc) => acc.reduce(task),
            None => acc = Some(task),
        }
    }
    Ok(acc.unwrap_or_else(factory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appendable::AppendableVector;
    use crate::key::Key;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct ByteHisto {
        counts: Vec<u64>,
    }

    impl MapReduce for ByteHisto {
        fn map(&mut self, chunks: &[Arc<Chunk>]) {
            self.counts = vec![0; 256];
            let chunk = &chunks[0];
            for i in 0..chunk.len() {
                if let Some(b) = chunk.get(i) {
                    self.counts[b as usize] += 1;
                }
            }
        }

        fn reduce(&mut self, other: Self) {
            for (a, b) in self.counts.iter_mut().zip(other.counts) {
                *a += b;
            }
        }
    }

    #[derive(Default)]
    struct Sum {
        sums: Vec<f64>,
    }

    impl MapReduce for Sum {
        fn map(&mut self, chunks: &[Arc<Chunk>]) {
            self.sums = chunks
                .iter()
                .map(|c| c.iter_f64().filter(|v| !v.is_nan()).sum())
                .collect();
        }

        fn reduce(&mut self, other: Self) {
            for (a, b) in self.sums.iter_mut().zip(other.sums) {
                *a += b;
            }
        }
    }

    #[derive(Default)]
    struct Starts(Vec<u64>);

    impl MapReduce for Starts {
        fn map(&mut self, chunks: &[Arc<Chunk>]) {
            self.0.push(chunks[0].start().unwrap());
        }

        fn reduce(&mut self, other: Self) {
            self.0.extend(other.0);
        }
    }

    fn build(store: &MemoryStore, name: &str, groups: &[&[(i64, i32)]]) -> Vector {
        let mut av = AppendableVector::new(Key::vec(name)).unwrap();
        for (cidx, rows) in groups.iter().enumerate() {
            let mut nc = av.new_chunk(cidx).unwrap();
            for &(m, e) in rows.iter() {
                nc.append(m, e);
            }
            av.close_chunk(store, cidx, nc).unwrap();
        }
        av.close().unwrap()
    }

    #[test]
    fn test_byte_histogram() {
        let store = MemoryStore::new();
        let text: Vec<(i64, i32)> = b"mpg,cyl,hp\n18,8,130\n15,8,165\n"
            .iter()
            .map(|&b| (b as i64, 0))
            .collect();
        let parts: Vec<&[(i64, i32)]> = text.chunks(8).collect();
        let vec = build(&store, "cars.csv", &parts);

        let histo = run_local(ByteHisto::default, &store, &[&vec]).unwrap();
        assert_eq!(histo.counts.iter().sum::<u64>(), vec.len());
        assert_eq!(histo.counts[b'\n' as usize], 3);
        assert_eq!(histo.counts[b'8' as usize], 3);
    }

    #[test]
    fn test_column_sums() {
        let store = MemoryStore::new();
        let a = build(&store, "a", &[&[(1, 0), (2, 0)], &[(3, 0)]]);
        let b = build(&store, "b", &[&[(15, -1), (NA.0, NA.1)], &[(25, -1)]]);
        let sum = run_local(Sum::default, &store, &[&a, &b]).unwrap();
        assert_eq!(sum.sums, vec![6.0, 4.0]);
    }

    const NA: (i64, i32) = (crate::precision::NA_MANTISSA, crate::precision::NA_EXPONENT);

    #[test]
    fn test_reduce_in_chunk_order() {
        let store = MemoryStore::new();
        let v = build(&store, "v", &[&[(1, 0); 3], &[(1, 0); 2], &[(1, 0); 4]]);
        let starts = run_local(Starts::default, &store, &[&v]).unwrap();
        assert_eq!(starts.0, vec![0, 3, 5]);
    }

    #[test]
    fn test_rejects_misaligned_vectors() {
        let store = MemoryStore::new();
        let a = build(&store, "a", &[&[(1, 0), (2, 0)], &[(3, 0)]]);
        let b = build(&store, "b", &[&[(1, 0)], &[(2, 0), (3, 0)]]);
        assert!(matches!(
            run_local(Sum::default, &store, &[&a, &b]),
            Err(FvecError::InvalidLayout(_))
        ));
        assert!(matches!(
            run_local(Sum::default, &store, &[]),
            Err(FvecError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_missing_chunk_propagates() {
        let store = MemoryStore::new();
        let v = build(&store, "v", &[&[(1, 0)], &[(2, 0)]]);
        store.remove(&v.chunk_key(1).unwrap());
        assert!(matches!(
            run_local(Sum::default, &store, &[&v]),
            Err(FvecError::MissingChunk(_))
        ));
    }

    #[test]
    fn test_empty_vector() {
        let store = MemoryStore::new();
        let v = Vector::new(Key::vec("e"), vec![0], f64::NAN, 0.0, 0.0).unwrap();
        let sum = run_local(Sum::default, &store, &[&v]).unwrap();
        assert!(sum.sums.is_empty());
    }
}
