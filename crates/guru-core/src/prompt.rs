//! Prompt builders for each generation variant.
//!
//! The wording matters less than the tag contract: every document must be
//! wrapped in exactly the tag pair its catalog entry declares, because the
//! demultiplexer extracts sections by those tags alone. Builders therefore
//! take the catalog as input and derive the tag instructions from it.

use serde::Deserialize;

use crate::section::SectionDescriptor;

/// One turn of an existing conversation, oldest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    /// `"user"` for the teacher, anything else for the model.
    pub role: String,
    pub text: String,
}

/// Prompt for the daily teaching package (with or without the video
/// section, depending on the catalog passed in).
pub fn lesson_package(
    subject: &str,
    grade: &str,
    topic: &str,
    sections: &[SectionDescriptor],
) -> String {
    let mut prompt = format!(
        "Anda adalah ahli kurikulum di Indonesia. Buat satu paket mengajar lengkap untuk:\n\
         - Mata Pelajaran: {subject}\n\
         - Kelas: {grade}\n\
         - Topik: {topic}\n\n\
         Hasilkan setiap bagian berikut secara berurutan, mengacu pada Kurikulum Merdeka.\n"
    );
    push_section_blocks(&mut prompt, sections);
    prompt
}

/// Prompt for the annual plan (program tahunan and program semester).
pub fn annual_plan(subject: &str, grade: &str, sections: &[SectionDescriptor]) -> String {
    let mut prompt = format!(
        "Anda adalah seorang ahli kurikulum senior di Indonesia dan seorang guru kreatif.\n\
         Buatlah perencanaan pembelajaran lengkap untuk satu tahun ajaran, mengacu pada \
         Kurikulum Merdeka.\n\n\
         Detail:\n\
         - Mata Pelajaran: {subject}\n\
         - Kelas: {grade}\n"
    );
    push_section_blocks(&mut prompt, sections);
    prompt
}

/// Conversational follow-up prompt. Previously generated documents go in
/// `context`; blank history turns are dropped.
pub fn chat(history: &[ChatTurn], context: Option<&str>, message: &str) -> String {
    let mut prompt = String::from(
        "Anda adalah \"Asisten Guru Cerdas\". Tugas Anda adalah membantu guru \
         menyempurnakan materi ajar.\n\
         INSTRUKSI PENTING:\n\
         1. Jawab pertanyaan atau perintah dari guru secara langsung dan to the point.\n\
         2. JANGAN ulangi pertanyaan atau konteks yang sudah diberikan oleh guru.\n\
         3. Fokus pada memberikan hasil atau perbaikan yang diminta, bukan penjelasan panjang.\n",
    );

    if let Some(context) = context {
        prompt.push_str("\nKonteks materi saat ini:\n---\n");
        prompt.push_str(context);
        prompt.push_str("\n---\n");
    }

    for turn in history {
        if turn.text.trim().is_empty() {
            continue;
        }
        let speaker = if turn.role == "user" { "Guru" } else { "Asisten" };
        prompt.push('\n');
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&turn.text);
    }

    prompt.push_str("\nGuru: ");
    prompt.push_str(message);
    prompt.push_str("\nAsisten:");
    prompt
}

/// Append one numbered instruction block per section, each naming its tag
/// pair explicitly.
fn push_section_blocks(prompt: &mut String, sections: &[SectionDescriptor]) {
    prompt.push_str(
        "\nBungkus setiap bagian PERSIS dengan penanda pembuka dan penutupnya, \
         tanpa teks lain di antara bagian.\n",
    );
    for (i, section) in sections.iter().enumerate() {
        prompt.push_str(&format!(
            "\nBagian {nomor}: {instruksi}\nAwali dengan {start} dan akhiri dengan {end}.\n",
            nomor = i + 1,
            instruksi = section_instruction(section.name),
            start = section.start_tag,
            end = section.end_tag,
        ));
    }
}

/// Per-section instruction text, keyed by the catalog name.
fn section_instruction(name: &str) -> &'static str {
    match name {
        "RPP" => {
            "RPP ringkas dengan elemen pembelajaran mendalam. Format: Tujuan Pembelajaran, \
             Kegiatan Pembelajaran (Pendahuluan, Inti, Penutup), Poin Materi Utama."
        }
        "LKPD" => {
            "Lembar Kerja Peserta Didik dengan petunjuk pengerjaan, aktivitas bertahap, \
             dan pertanyaan refleksi."
        }
        "KISI" => {
            "Kisi-kisi untuk 15 soal (10 Pilihan Ganda, 5 Esai) dengan format vertikal \
             untuk setiap soal: Nomor, Indikator Soal, Level Kognitif (C1, C2, C3, dst.), \
             Bentuk Soal. Pisahkan setiap soal dengan baris kosong."
        }
        "SOAL" => {
            "Soal evaluasi: 15 soal (10 Pilihan Ganda dengan opsi a, b, c, d dan 5 Esai) \
             berdasarkan kisi-kisi. Sertakan Kunci Jawaban di bagian akhir."
        }
        "MATERI" => {
            "Ringkasan materi ajar yang jelas dan padat dalam format poin-poin atau \
             paragraf singkat yang mudah dipahami oleh siswa."
        }
        "VIDEO" => {
            "Rekomendasi 3 video pembelajaran. Untuk setiap video tuliskan 'Judul Video:' \
             dan 'Deskripsi:' pada baris terpisah, pisahkan antar video dengan baris kosong."
        }
        "PROTA" => {
            "Program Tahunan (Prota) dalam format tabel markdown. Kolom: Semester, Tujuan \
             Pembelajaran (TP), Alokasi Waktu (dalam Jam Pelajaran)."
        }
        "PROMES" => {
            "Program Semester (Promes) untuk Semester Ganjil dalam format tabel markdown. \
             Kolom: Tujuan Pembelajaran (TP), Materi Pokok, dan alokasi per bulan (Juli, \
             Agustus, September, Oktober, November, Desember)."
        }
        _ => "Isi bagian ini sesuai konteks permintaan.",
    }
}
