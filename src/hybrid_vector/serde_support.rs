use core::{fmt, marker::PhantomData};

use serde::{
    de::{Deserialize, Deserializer, Error, SeqAccess, Visitor},
    ser::{Serialize, SerializeSeq, Serializer},
};

use super::HybridVector;

impl<T, const N: usize> Serialize for HybridVector<T, N>
where
    T: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_seq(Some(self.len()))?;
        for item in self {
            state.serialize_element(item)?;
        }
        state.end()
    }
}

impl<'de, T, const N: usize> Deserialize<'de> for HybridVector<T, N>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(HybridVectorVisitor {
            phantom: PhantomData,
        })
    }
}

struct HybridVectorVisitor<T, const N: usize> {
    phantom: PhantomData<T>,
}

impl<'de, T, const N: usize> Visitor<'de> for HybridVectorVisitor<T, N>
where
    T: Deserialize<'de>,
{
    type Value = HybridVector<T, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = HybridVector::new();
        values
            .try_reserve(seq.size_hint().unwrap_or(0))
            .map_err(A::Error::custom)?;

        while let Some(value) = seq.next_element()? {
            values.try_push(value).map_err(A::Error::custom)?;
        }

        Ok(values)
    }
}
