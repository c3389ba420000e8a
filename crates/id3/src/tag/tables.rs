//! Static lookup tables

use super::FrameId;

/// The standard ID3v1 genres. A genre byte indexes this table.
pub const GENRES: [&str; 80] = [
	"Blues",
	"Classic Rock",
	"Country",
	"Dance",
	"Disco",
	"Funk",
	"Grunge",
	"Hip-Hop",
	"Jazz",
	"Metal",
	"New Age",
	"Oldies",
	"Other",
	"Pop",
	"R&B",
	"Rap",
	"Reggae",
	"Rock",
	"Techno",
	"Industrial",
	"Alternative",
	"Ska",
	"Death Metal",
	"Pranks",
	"Soundtrack",
	"Euro-Techno",
	"Ambient",
	"Trip-Hop",
	"Vocal",
	"Jazz+Funk",
	"Fusion",
	"Trance",
	"Classical",
	"Instrumental",
	"Acid",
	"House",
	"Game",
	"Sound Clip",
	"Gospel",
	"Noise",
	"AlternRock",
	"Bass",
	"Soul",
	"Punk",
	"Space",
	"Meditative",
	"Instrumental Pop",
	"Instrumental Rock",
	"Ethnic",
	"Gothic",
	"Darkwave",
	"Techno-Industrial",
	"Electronic",
	"Pop-Folk",
	"Eurodance",
	"Dream",
	"Southern Rock",
	"Comedy",
	"Cult",
	"Gangsta",
	"Top 40",
	"Christian Rap",
	"Pop/Funk",
	"Jungle",
	"Native American",
	"Cabaret",
	"New Wave",
	"Psychadelic",
	"Rave",
	"Showtunes",
	"Trailer",
	"Lo-Fi",
	"Tribal",
	"Acid Punk",
	"Acid Jazz",
	"Polka",
	"Retro",
	"Musical",
	"Rock & Roll",
	"Hard Rock",
];

/// Find the ID3v1 genre byte for a `TCON` value.
///
/// Accepts genre names (case-insensitive), bare indices (`17`)
/// and the ID3v2.3 reference form (`(17)`).
pub fn genre_index(genre: &str) -> Option<u8> {
	let genre = genre.trim();
	let bare = genre
		.strip_prefix('(')
		.and_then(|x| x.split_once(')'))
		.map(|(n, _)| n)
		.unwrap_or(genre);

	if let Ok(n) = bare.parse::<u8>() {
		return Some(n);
	}

	GENRES
		.iter()
		.position(|x| x.eq_ignore_ascii_case(genre))
		.and_then(|x| u8::try_from(x).ok())
}

pub fn frame_description(id: &FrameId) -> &'static str {
	match id.as_bytes() {
		b"AENC" => "Audio encryption",
		b"APIC" => "Attached picture",
		b"COMM" => "Comments",
		b"GEOB" => "General encapsulated object",
		b"MCDI" => "Music CD identifier",
		b"PCNT" => "Play counter",
		b"POPM" => "Popularimeter",
		b"PRIV" => "Private frame",
		b"SEEK" => "Seek frame",
		b"TALB" => "Album/Movie/Show title",
		b"TBPM" => "BPM (beats per minute)",
		b"TCOM" => "Composer",
		b"TCON" => "Content type",
		b"TCOP" => "Copyright message",
		b"TDRC" => "Recording time",
		b"TDRL" => "Release time",
		b"TENC" => "Encoded by",
		b"TEXT" => "Lyricist/Text writer",
		b"TIT1" => "Content group description",
		b"TIT2" => "Title/songname/content description",
		b"TIT3" => "Subtitle/Description refinement",
		b"TLAN" => "Language(s)",
		b"TLEN" => "Length",
		b"TPE1" => "Lead performer(s)/Soloist(s)",
		b"TPE2" => "Band/orchestra/accompaniment",
		b"TPE3" => "Conductor/performer refinement",
		b"TPOS" => "Part of a set",
		b"TPUB" => "Publisher",
		b"TRCK" => "Track number/Position in set",
		b"TSSE" => "Software/Hardware and settings used for encoding",
		b"TXXX" => "User defined text information frame",
		b"TYER" => "Year",
		b"UFID" => "Unique file identifier",
		b"USLT" => "Unsynchronised lyric/text transcription",
		b"WCOM" => "Commercial information",
		b"WOAR" => "Official artist/performer webpage",
		b"WXXX" => "User defined URL link frame",
		[b'T', ..] => "Text information frame",
		[b'W', ..] => "URL link frame",
		_ => "Unknown frame",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn genre_lookup() {
		assert_eq!(genre_index("Blues"), Some(0));
		assert_eq!(genre_index("hard rock"), Some(79));
		assert_eq!(genre_index("(17)"), Some(17));
		assert_eq!(genre_index("(17)Rock"), Some(17));
		assert_eq!(genre_index("42"), Some(42));
		assert_eq!(genre_index("Vaporwave"), None);
	}
}
