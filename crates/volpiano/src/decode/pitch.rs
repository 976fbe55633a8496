//! Staff positions and MIDI pitches (G clef).

use crate::alphabet::CharGroup;

/// Natural MIDI pitch of each staff position, `8` (F3) up to `s` (D6).
const NATURAL_PITCHES: [u8; 20] = [
    53, 55, 57, 59, 60, 62, 64, 65, 67, 69, 71, 72, 74, 76, 77, 79, 81, 83, 84, 86,
];

/// Staff position (0 = `8`) of a note or liquescent.
pub fn staff_position(c: char) -> Option<usize> {
    CharGroup::Notes
        .chars()
        .find(c)
        .or_else(|| CharGroup::Liquescents.chars().find(c))
}

/// Staff position altered by a flat or natural sign.
///
/// Flats exist on B3, E4, B4, E5 and B5; naturals mirror them in upper case.
pub fn accidental_target(c: char) -> Option<usize> {
    let note = match c.to_ascii_lowercase() {
        'y' => 'b',
        'w' => 'e',
        'i' => 'j',
        'x' => 'm',
        'z' => 'q',
        _ => return None,
    };
    staff_position(note)
}

/// MIDI pitch of a staff position, lowered by a semitone when flat.
pub fn midi_pitch(position: usize, flat: bool) -> u8 {
    let pitch = NATURAL_PITCHES[position];
    if flat {
        pitch - 1
    } else {
        pitch
    }
}
