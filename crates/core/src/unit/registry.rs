use uom::si::{
    amount_of_substance::mole,
    angle::{degree, radian},
    electric_current::ampere,
    energy::{joule, kilojoule},
    f64::{
        AmountOfSubstance, Angle, ElectricCurrent, Energy, Force, Length, LuminousIntensity, Mass,
        Power, Pressure, Ratio, TemperatureInterval, Time,
    },
    force::{kilonewton, newton, pound_force},
    length::{centimeter, foot, inch, kilometer, meter, millimeter},
    luminous_intensity::candela,
    mass::{gram, kilogram, pound},
    power::{kilowatt, watt},
    pressure::{bar, gigapascal, kilopascal, megapascal, pascal, pound_force_per_square_inch},
    ratio::percent,
    temperature_interval::{degree_rankine, kelvin},
    time::{hour, minute, second},
};

use crate::Dimension;

const FORCE: Dimension = Dimension::new([1, 1, -2, 0, 0, 0, 0]);
const PRESSURE: Dimension = Dimension::new([-1, 1, -2, 0, 0, 0, 0]);
const ENERGY: Dimension = Dimension::new([2, 1, -2, 0, 0, 0, 0]);
const POWER: Dimension = Dimension::new([2, 1, -3, 0, 0, 0, 0]);

/// Resolves a named unit to its SI conversion factor and dimension.
///
/// Factors come from `uom`'s unit definitions: a quantity of one unit is
/// created and its base-unit value read back. Angles are treated as
/// dimensionless and temperatures as intervals.
pub(super) fn lookup(symbol: &str) -> Option<(f64, Dimension)> {
    let entry = match symbol {
        "m" => (Length::new::<meter>(1.0).value, Dimension::LENGTH),
        "cm" => (Length::new::<centimeter>(1.0).value, Dimension::LENGTH),
        "mm" => (Length::new::<millimeter>(1.0).value, Dimension::LENGTH),
        "km" => (Length::new::<kilometer>(1.0).value, Dimension::LENGTH),
        "in" => (Length::new::<inch>(1.0).value, Dimension::LENGTH),
        "ft" => (Length::new::<foot>(1.0).value, Dimension::LENGTH),

        "kg" => (Mass::new::<kilogram>(1.0).value, Dimension::MASS),
        "g" => (Mass::new::<gram>(1.0).value, Dimension::MASS),
        "lbm" => (Mass::new::<pound>(1.0).value, Dimension::MASS),

        "s" => (Time::new::<second>(1.0).value, Dimension::TIME),
        "min" => (Time::new::<minute>(1.0).value, Dimension::TIME),
        "hr" => (Time::new::<hour>(1.0).value, Dimension::TIME),

        "N" => (Force::new::<newton>(1.0).value, FORCE),
        "kN" => (Force::new::<kilonewton>(1.0).value, FORCE),
        "lbf" => (Force::new::<pound_force>(1.0).value, FORCE),

        "Pa" => (Pressure::new::<pascal>(1.0).value, PRESSURE),
        "kPa" => (Pressure::new::<kilopascal>(1.0).value, PRESSURE),
        "MPa" => (Pressure::new::<megapascal>(1.0).value, PRESSURE),
        "GPa" => (Pressure::new::<gigapascal>(1.0).value, PRESSURE),
        "bar" => (Pressure::new::<bar>(1.0).value, PRESSURE),
        "psi" => (
            Pressure::new::<pound_force_per_square_inch>(1.0).value,
            PRESSURE,
        ),
        "ksi" => (
            Pressure::new::<pound_force_per_square_inch>(1000.0).value,
            PRESSURE,
        ),

        "J" => (Energy::new::<joule>(1.0).value, ENERGY),
        "kJ" => (Energy::new::<kilojoule>(1.0).value, ENERGY),
        "W" => (Power::new::<watt>(1.0).value, POWER),
        "kW" => (Power::new::<kilowatt>(1.0).value, POWER),

        "K" => (
            TemperatureInterval::new::<kelvin>(1.0).value,
            Dimension::TEMPERATURE,
        ),
        "degR" => (
            TemperatureInterval::new::<degree_rankine>(1.0).value,
            Dimension::TEMPERATURE,
        ),

        "A" => (
            ElectricCurrent::new::<ampere>(1.0).value,
            Dimension::CURRENT,
        ),
        "mol" => (
            AmountOfSubstance::new::<mole>(1.0).value,
            Dimension::AMOUNT,
        ),
        "cd" => (
            LuminousIntensity::new::<candela>(1.0).value,
            Dimension::LUMINOSITY,
        ),

        "rad" => (Angle::new::<radian>(1.0).value, Dimension::DIMENSIONLESS),
        "deg" => (Angle::new::<degree>(1.0).value, Dimension::DIMENSIONLESS),
        "%" => (Ratio::new::<percent>(1.0).value, Dimension::DIMENSIONLESS),

        _ => return None,
    };

    Some(entry)
}
