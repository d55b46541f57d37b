// =============================================================================
// Row Filter Policies
// =============================================================================
//
// A computed indicator table keeps a row only when *every* field its policy
// requires is defined on that row (all-or-nothing filtering).  The single
// symbol view and the comparison view deliberately require different field
// sets, so each is a named policy rather than a generic "drop NaN".

/// A column a policy can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Close,
    Volume,
    Ma30,
    Ma90,
    Rsi,
    Macd,
    MacdSignal,
    BollingerUpper,
    BollingerLower,
    Vwap,
}

/// Declares which fields must be present for a row to survive.
pub trait RowFilterPolicy {
    fn required_fields(&self) -> &'static [RequiredField];
}

/// Anything that can answer "is field F defined at row i".
pub trait FieldSource {
    fn row_count(&self) -> usize;
    fn field(&self, field: RequiredField, row: usize) -> Option<f64>;
}

/// Required set for the single-symbol indicator view.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullIndicatorPolicy;

impl RowFilterPolicy for FullIndicatorPolicy {
    fn required_fields(&self) -> &'static [RequiredField] {
        &[
            RequiredField::Close,
            RequiredField::Volume,
            RequiredField::Ma30,
            RequiredField::Ma90,
            RequiredField::Rsi,
            RequiredField::Macd,
            RequiredField::MacdSignal,
            RequiredField::BollingerUpper,
            RequiredField::BollingerLower,
            RequiredField::Vwap,
        ]
    }
}

/// Required set for the normalized multi-symbol comparison.  Momentum and
/// volatility indicators are neither computed nor checked there.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonIndicatorPolicy;

impl RowFilterPolicy for ComparisonIndicatorPolicy {
    fn required_fields(&self) -> &'static [RequiredField] {
        &[
            RequiredField::Close,
            RequiredField::Ma30,
            RequiredField::Ma90,
            RequiredField::Vwap,
        ]
    }
}

/// Indices of the rows of `source` on which every field `policy` requires
/// is defined, in ascending order.
pub fn retained_rows<P, S>(policy: &P, source: &S) -> Vec<usize>
where
    P: RowFilterPolicy + ?Sized,
    S: FieldSource + ?Sized,
{
    let fields = policy.required_fields();
    (0..source.row_count())
        .filter(|&row| fields.iter().all(|&f| source.field(f, row).is_some()))
        .collect()
}
