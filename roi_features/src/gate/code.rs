//! Feature code enumeration. Declaration order is the output column order.

use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum FeatureCode {
    // Pixel intensity statistics
    Mean,
    Median,
    Min,
    Max,
    Range,
    StandardDeviation,
    Skewness,
    Kurtosis,
    MeanAbsoluteDeviation,
    Energy,
    RootMeanSquared,
    Entropy,
    Mode,
    Uniformity,
    #[strum(serialize = "P10")]
    P10,
    #[strum(serialize = "P25")]
    P25,
    #[strum(serialize = "P75")]
    P75,
    #[strum(serialize = "P90")]
    P90,
    InterquartileRange,
    RobustMeanAbsoluteDeviation,
    WeightedCentroidY,
    WeightedCentroidX,

    // Morphology
    AreaPixelsCount,
    CentroidX,
    CentroidY,
    BboxYmin,
    BboxXmin,
    BboxHeight,
    BboxWidth,

    // Ellipse fit
    MajorAxisLength,
    MinorAxisLength,
    Eccentricity,
    Orientation,

    NumNeighbors,

    Extent,
    AspectRatio,

    ConvexHullArea,
    Solidity,

    // Contour
    Perimeter,
    EquivalentDiameter,
    EdgeMeanIntensity,
    EdgeStddevIntensity,
    EdgeMaxIntensity,
    EdgeMinIntensity,
    EdgeIntegratedIntensity,
    Circularity,

    // Extrema points
    #[strum(serialize = "EXTREMA_P1_X")]
    ExtremaP1X,
    #[strum(serialize = "EXTREMA_P1_Y")]
    ExtremaP1Y,
    #[strum(serialize = "EXTREMA_P2_X")]
    ExtremaP2X,
    #[strum(serialize = "EXTREMA_P2_Y")]
    ExtremaP2Y,
    #[strum(serialize = "EXTREMA_P3_X")]
    ExtremaP3X,
    #[strum(serialize = "EXTREMA_P3_Y")]
    ExtremaP3Y,
    #[strum(serialize = "EXTREMA_P4_X")]
    ExtremaP4X,
    #[strum(serialize = "EXTREMA_P4_Y")]
    ExtremaP4Y,
    #[strum(serialize = "EXTREMA_P5_X")]
    ExtremaP5X,
    #[strum(serialize = "EXTREMA_P5_Y")]
    ExtremaP5Y,
    #[strum(serialize = "EXTREMA_P6_X")]
    ExtremaP6X,
    #[strum(serialize = "EXTREMA_P6_Y")]
    ExtremaP6Y,
    #[strum(serialize = "EXTREMA_P7_X")]
    ExtremaP7X,
    #[strum(serialize = "EXTREMA_P7_Y")]
    ExtremaP7Y,
    #[strum(serialize = "EXTREMA_P8_X")]
    ExtremaP8X,
    #[strum(serialize = "EXTREMA_P8_Y")]
    ExtremaP8Y,

    // Caliper diameters
    MinFeretDiameter,
    MaxFeretDiameter,
    MinFeretAngle,
    MaxFeretAngle,
    StatFeretDiamMin,
    StatFeretDiamMax,
    StatFeretDiamMean,
    StatFeretDiamMedian,
    StatFeretDiamStddev,
    StatFeretDiamMode,
    StatMartinDiamMin,
    StatMartinDiamMax,
    StatMartinDiamMean,
    StatMartinDiamMedian,
    StatMartinDiamStddev,
    StatMartinDiamMode,
    StatNassensteinDiamMin,
    StatNassensteinDiamMax,
    StatNassensteinDiamMean,
    StatNassensteinDiamMedian,
    StatNassensteinDiamStddev,
    StatNassensteinDiamMode,

    EulerNumber,

    PolygonalityAve,
    HexagonalityAve,
    HexagonalityStddev,

    DiameterMinEnclosingCircle,
    DiameterCircumscribingCircle,
    DiameterInscribingCircle,
    GeodeticLength,
    Thickness,

    // GLCM (Haralick)
    #[strum(serialize = "TEXTURE_ANGULAR2NDMOMENT")]
    TextureAngular2ndMoment,
    #[strum(serialize = "TEXTURE_CONTRAST")]
    TextureContrast,
    #[strum(serialize = "TEXTURE_CORRELATION")]
    TextureCorrelation,
    #[strum(serialize = "TEXTURE_VARIANCE")]
    TextureVariance,
    #[strum(serialize = "TEXTURE_INVERSEDIFFERENCEMOMENT")]
    TextureInverseDifferenceMoment,
    #[strum(serialize = "TEXTURE_SUMAVERAGE")]
    TextureSumAverage,
    #[strum(serialize = "TEXTURE_SUMVARIANCE")]
    TextureSumVariance,
    #[strum(serialize = "TEXTURE_SUMENTROPY")]
    TextureSumEntropy,
    #[strum(serialize = "TEXTURE_ENTROPY")]
    TextureEntropy,
    #[strum(serialize = "TEXTURE_DIFFERENCEVARIANCE")]
    TextureDifferenceVariance,
    #[strum(serialize = "TEXTURE_DIFFERENCEENTROPY")]
    TextureDifferenceEntropy,
    #[strum(serialize = "TEXTURE_INFOMEAS1")]
    TextureInfoMeas1,
    #[strum(serialize = "TEXTURE_INFOMEAS2")]
    TextureInfoMeas2,
    /// Zernike magnitudes; spans [`ZERNIKE_COLUMNS`] output columns.
    #[strum(serialize = "TEXTURE_ZERNIKE2D")]
    TextureZernike2D,

    // GLRLM
    GlrlmSre,
    GlrlmLre,
    GlrlmGln,
    GlrlmGlnn,
    GlrlmRln,
    GlrlmRlnn,
    GlrlmRp,
    GlrlmGlv,
    GlrlmRv,
    GlrlmRe,
    GlrlmLglre,
    GlrlmHglre,
    GlrlmSrlgle,
    GlrlmSrhgle,
    GlrlmLrlgle,
    GlrlmLrhgle,

    // GLSZM
    GlszmSae,
    GlszmLae,
    GlszmGln,
    GlszmGlnn,
    GlszmSzn,
    GlszmSznn,
    GlszmZp,
    GlszmGlv,
    GlszmZv,
    GlszmZe,
    GlszmLglze,
    GlszmHglze,
    GlszmSalgle,
    GlszmSahgle,
    GlszmLalgle,
    GlszmLahgle,

    // GLDM
    GldmSde,
    GldmLde,
    GldmGln,
    GldmDn,
    GldmDnn,
    GldmGlv,
    GldmDv,
    GldmDe,
    GldmLgle,
    GldmHgle,
    GldmSdlgle,
    GldmSdhgle,
    GldmLdlgle,
    GldmLdhgle,

    // NGTDM
    NgtdmCoarseness,
    NgtdmContrast,
    NgtdmBusyness,
    NgtdmComplexity,
    NgtdmStrength,

    // Hu invariant moments
    #[strum(serialize = "HU_M1")]
    HuM1,
    #[strum(serialize = "HU_M2")]
    HuM2,
    #[strum(serialize = "HU_M3")]
    HuM3,
    #[strum(serialize = "HU_M4")]
    HuM4,
    #[strum(serialize = "HU_M5")]
    HuM5,
    #[strum(serialize = "HU_M6")]
    HuM6,
    #[strum(serialize = "HU_M7")]
    HuM7,
}

use FeatureCode::*;

/// Zernike moment order; magnitudes for every `(n, m)` with `m <= n <= order`
/// and `n - m` even.
pub const ZERNIKE_ORDER: usize = 9;

/// Column names of [`FeatureCode::TextureZernike2D`], ordered by `n` then `m`.
pub const ZERNIKE_COLUMNS: [&str; 30] = [
    "TEXTURE_ZERNIKE2D_Z00",
    "TEXTURE_ZERNIKE2D_Z11",
    "TEXTURE_ZERNIKE2D_Z20",
    "TEXTURE_ZERNIKE2D_Z22",
    "TEXTURE_ZERNIKE2D_Z31",
    "TEXTURE_ZERNIKE2D_Z33",
    "TEXTURE_ZERNIKE2D_Z40",
    "TEXTURE_ZERNIKE2D_Z42",
    "TEXTURE_ZERNIKE2D_Z44",
    "TEXTURE_ZERNIKE2D_Z51",
    "TEXTURE_ZERNIKE2D_Z53",
    "TEXTURE_ZERNIKE2D_Z55",
    "TEXTURE_ZERNIKE2D_Z60",
    "TEXTURE_ZERNIKE2D_Z62",
    "TEXTURE_ZERNIKE2D_Z64",
    "TEXTURE_ZERNIKE2D_Z66",
    "TEXTURE_ZERNIKE2D_Z71",
    "TEXTURE_ZERNIKE2D_Z73",
    "TEXTURE_ZERNIKE2D_Z75",
    "TEXTURE_ZERNIKE2D_Z77",
    "TEXTURE_ZERNIKE2D_Z80",
    "TEXTURE_ZERNIKE2D_Z82",
    "TEXTURE_ZERNIKE2D_Z84",
    "TEXTURE_ZERNIKE2D_Z86",
    "TEXTURE_ZERNIKE2D_Z88",
    "TEXTURE_ZERNIKE2D_Z91",
    "TEXTURE_ZERNIKE2D_Z93",
    "TEXTURE_ZERNIKE2D_Z95",
    "TEXTURE_ZERNIKE2D_Z97",
    "TEXTURE_ZERNIKE2D_Z99",
];

/// Slots in a full feature row: one per code plus the extra Zernike columns.
pub const TOTAL_COLUMNS: usize = FeatureCode::COUNT + ZERNIKE_COLUMNS.len() - 1;

impl FeatureCode {
    /// Position in the enumeration.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of output columns the code fills.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            TextureZernike2D => ZERNIKE_COLUMNS.len(),
            _ => 1,
        }
    }

    /// First slot of the code in a full feature row.
    #[inline]
    pub const fn offset(self) -> usize {
        let i = self.index();
        if i > TextureZernike2D.index() {
            i + ZERNIKE_COLUMNS.len() - 1
        } else {
            i
        }
    }

    /// User-facing name, e.g. `"STAT_FERET_DIAM_MEDIAN"`.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Header names of the columns the code fills.
    pub fn column_names(self) -> Vec<&'static str> {
        match self {
            TextureZernike2D => ZERNIKE_COLUMNS.to_vec(),
            _ => vec![self.name()],
        }
    }
}


pub const INTENSITY: &[FeatureCode] = &[
    Mean,
    Median,
    Min,
    Max,
    Range,
    StandardDeviation,
    Skewness,
    Kurtosis,
    MeanAbsoluteDeviation,
    Energy,
    RootMeanSquared,
    Entropy,
    Mode,
    Uniformity,
    P10,
    P25,
    P75,
    P90,
    InterquartileRange,
    RobustMeanAbsoluteDeviation,
    WeightedCentroidY,
    WeightedCentroidX,
];

pub const MORPHOLOGY: &[FeatureCode] = &[
    AreaPixelsCount,
    CentroidX,
    CentroidY,
    BboxYmin,
    BboxXmin,
    BboxHeight,
    BboxWidth,
    Extent,
    AspectRatio,
];

pub const BOUNDING_BOX: &[FeatureCode] = &[BboxYmin, BboxXmin, BboxHeight, BboxWidth];

pub const ELLIPSE: &[FeatureCode] = &[MajorAxisLength, MinorAxisLength, Eccentricity, Orientation];

pub const NEIGHBORS: &[FeatureCode] = &[NumNeighbors];

pub const CONVEX_HULL: &[FeatureCode] = &[ConvexHullArea, Solidity];

pub const CONTOUR: &[FeatureCode] = &[
    Perimeter,
    EquivalentDiameter,
    EdgeMeanIntensity,
    EdgeStddevIntensity,
    EdgeMaxIntensity,
    EdgeMinIntensity,
    EdgeIntegratedIntensity,
    Circularity,
];

pub const EXTREMA: &[FeatureCode] = &[
    ExtremaP1X, ExtremaP1Y, ExtremaP2X, ExtremaP2Y, ExtremaP3X, ExtremaP3Y, ExtremaP4X, ExtremaP4Y,
    ExtremaP5X, ExtremaP5Y, ExtremaP6X, ExtremaP6Y, ExtremaP7X, ExtremaP7Y, ExtremaP8X, ExtremaP8Y,
];

pub const EULER: &[FeatureCode] = &[EulerNumber];

pub const FERET: &[FeatureCode] = &[
    MinFeretDiameter,
    MaxFeretDiameter,
    MinFeretAngle,
    MaxFeretAngle,
    StatFeretDiamMin,
    StatFeretDiamMax,
    StatFeretDiamMean,
    StatFeretDiamMedian,
    StatFeretDiamStddev,
    StatFeretDiamMode,
];

pub const MARTIN: &[FeatureCode] = &[
    StatMartinDiamMin,
    StatMartinDiamMax,
    StatMartinDiamMean,
    StatMartinDiamMedian,
    StatMartinDiamStddev,
    StatMartinDiamMode,
];

pub const NASSENSTEIN: &[FeatureCode] = &[
    StatNassensteinDiamMin,
    StatNassensteinDiamMax,
    StatNassensteinDiamMean,
    StatNassensteinDiamMedian,
    StatNassensteinDiamStddev,
    StatNassensteinDiamMode,
];

pub const POLYGONALITY: &[FeatureCode] = &[PolygonalityAve, HexagonalityAve, HexagonalityStddev];

pub const CIRCLES: &[FeatureCode] = &[
    DiameterMinEnclosingCircle,
    DiameterCircumscribingCircle,
    DiameterInscribingCircle,
];

pub const GEODETIC: &[FeatureCode] = &[GeodeticLength, Thickness];

pub const GLCM: &[FeatureCode] = &[
    TextureAngular2ndMoment,
    TextureContrast,
    TextureCorrelation,
    TextureVariance,
    TextureInverseDifferenceMoment,
    TextureSumAverage,
    TextureSumVariance,
    TextureSumEntropy,
    TextureEntropy,
    TextureDifferenceVariance,
    TextureDifferenceEntropy,
    TextureInfoMeas1,
    TextureInfoMeas2,
];

pub const GLRLM: &[FeatureCode] = &[
    GlrlmSre,
    GlrlmLre,
    GlrlmGln,
    GlrlmGlnn,
    GlrlmRln,
    GlrlmRlnn,
    GlrlmRp,
    GlrlmGlv,
    GlrlmRv,
    GlrlmRe,
    GlrlmLglre,
    GlrlmHglre,
    GlrlmSrlgle,
    GlrlmSrhgle,
    GlrlmLrlgle,
    GlrlmLrhgle,
];

pub const ZERNIKE: &[FeatureCode] = &[TextureZernike2D];

pub const GLSZM: &[FeatureCode] = &[
    GlszmSae,
    GlszmLae,
    GlszmGln,
    GlszmGlnn,
    GlszmSzn,
    GlszmSznn,
    GlszmZp,
    GlszmGlv,
    GlszmZv,
    GlszmZe,
    GlszmLglze,
    GlszmHglze,
    GlszmSalgle,
    GlszmSahgle,
    GlszmLalgle,
    GlszmLahgle,
];

pub const GLDM: &[FeatureCode] = &[
    GldmSde,
    GldmLde,
    GldmGln,
    GldmDn,
    GldmDnn,
    GldmGlv,
    GldmDv,
    GldmDe,
    GldmLgle,
    GldmHgle,
    GldmSdlgle,
    GldmSdhgle,
    GldmLdlgle,
    GldmLdhgle,
];

pub const NGTDM: &[FeatureCode] = &[
    NgtdmCoarseness,
    NgtdmContrast,
    NgtdmBusyness,
    NgtdmComplexity,
    NgtdmStrength,
];

pub const HU_MOMENTS: &[FeatureCode] = &[HuM1, HuM2, HuM3, HuM4, HuM5, HuM6, HuM7];

/// Named presets selectable from configuration with `*TOKEN*` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum FeatureGroup {
    All,
    Intensity,
    Morphology,
    BoundingBox,
    Feret,
    Texture,
    Glcm,
    Glrlm,
    Glszm,
    Gldm,
    Ngtdm,
    Moments,
}

impl FeatureGroup {
    pub fn token(self) -> &'static str {
        match self {
            FeatureGroup::All => "*ALL*",
            FeatureGroup::Intensity => "*ALL_INTENSITY*",
            FeatureGroup::Morphology => "*ALL_MORPHOLOGY*",
            FeatureGroup::BoundingBox => "*BASIC_MORPHOLOGY*",
            FeatureGroup::Feret => "*ALL_FERET*",
            FeatureGroup::Texture => "*ALL_TEXTURE*",
            FeatureGroup::Glcm => "*ALL_GLCM*",
            FeatureGroup::Glrlm => "*ALL_GLRLM*",
            FeatureGroup::Glszm => "*ALL_GLSZM*",
            FeatureGroup::Gldm => "*ALL_GLDM*",
            FeatureGroup::Ngtdm => "*ALL_NGTDM*",
            FeatureGroup::Moments => "*ALL_MOMENTS*",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        FeatureGroup::iter().find(|g| g.token().eq_ignore_ascii_case(token))
    }

    pub fn codes(self) -> Vec<FeatureCode> {
        use strum::IntoEnumIterator;
        match self {
            FeatureGroup::All => FeatureCode::iter().collect(),
            FeatureGroup::Intensity => INTENSITY.to_vec(),
            FeatureGroup::Morphology => [
                MORPHOLOGY,
                ELLIPSE,
                NEIGHBORS,
                CONVEX_HULL,
                CONTOUR,
                EXTREMA,
                EULER,
                FERET,
                MARTIN,
                NASSENSTEIN,
                POLYGONALITY,
                CIRCLES,
                GEODETIC,
            ]
            .concat(),
            FeatureGroup::BoundingBox => BOUNDING_BOX.to_vec(),
            FeatureGroup::Feret => FERET.to_vec(),
            FeatureGroup::Texture => [GLCM, ZERNIKE, GLRLM, GLSZM, GLDM, NGTDM].concat(),
            FeatureGroup::Glcm => GLCM.to_vec(),
            FeatureGroup::Glrlm => GLRLM.to_vec(),
            FeatureGroup::Glszm => GLSZM.to_vec(),
            FeatureGroup::Gldm => GLDM.to_vec(),
            FeatureGroup::Ngtdm => NGTDM.to_vec(),
            FeatureGroup::Moments => HU_MOMENTS.to_vec(),
        }
    }
}
